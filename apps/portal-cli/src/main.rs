//! Mentor portal CLI - sign in, manage curriculums and schedule classes.

mod commands;
mod output;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use commands::{CurriculumEdits, Portal};
use mentor_api::DEFAULT_CLASS_TIME;
use portal_config_and_utils::{init_logging, Config, Paths};
use tracing::debug;

/// Mentor portal CLI.
#[derive(Parser)]
#[command(name = "mentor-portal")]
#[command(about = "Mentor portal CLI for curriculums and class scheduling")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error); defaults to the config file
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Login with email and password
    Login {
        /// Email address; prompted for when omitted
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Logout and clear stored tokens
    Logout,

    /// Check authentication status
    Status,

    /// Send a password reset code to an email address
    ForgotPassword {
        /// Email address; prompted for when omitted
        email: Option<String>,
    },

    /// Verify the password reset code
    VerifyOtp {
        /// Six-digit code from the email
        otp: String,
    },

    /// Send the password reset code again
    ResendOtp,

    /// Choose a new password after verifying the code
    ResetPassword,

    /// List assigned courses
    Courses,

    /// List topics
    Topics,

    /// Manage curriculums
    Curriculum {
        #[command(subcommand)]
        command: CurriculumCommands,
    },

    /// Manage scheduled classes
    Classes {
        #[command(subcommand)]
        command: ClassCommands,
    },
}

#[derive(Subcommand)]
enum CurriculumCommands {
    /// List curriculums with progress
    List,
    /// Create a curriculum for an assigned course
    Create {
        /// Course ID
        #[arg(short, long)]
        course: String,
        /// Topic name (repeat for several topics)
        #[arg(short, long = "topic", required = true)]
        topics: Vec<String>,
    },
    /// Rename, delete or add topics
    Edit {
        /// Curriculum ID
        id: String,
        /// Rename a topic, as TOPIC_ID=NAME
        #[arg(long)]
        rename: Vec<String>,
        /// Delete a topic by ID
        #[arg(long)]
        delete: Vec<String>,
        /// Add a topic
        #[arg(long)]
        add: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ClassCommands {
    /// Show upcoming classes
    Upcoming {
        /// Only show classes on this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Show courses and topics available for scheduling
    Options,
    /// Schedule a class
    Schedule {
        /// Topic ID
        #[arg(short, long)]
        topic: Option<String>,
        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Local time (HH:MM)
        #[arg(long, default_value = DEFAULT_CLASS_TIME)]
        time: String,
    },
    /// Move a class to a new date and time
    Reschedule {
        /// Class ID
        id: String,
        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
        /// Local time (HH:MM)
        #[arg(long, default_value = DEFAULT_CLASS_TIME)]
        time: String,
    },
    /// Cancel a class
    Cancel {
        /// Class ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

async fn run(cli: Cli, portal: Portal) -> anyhow::Result<()> {
    let format = &cli.format;
    match cli.command {
        Commands::Login { email } => commands::login(&portal, email, format).await,
        Commands::Logout => commands::logout(&portal, format),
        Commands::Status => commands::status(&portal, format).await,
        Commands::ForgotPassword { email } => {
            commands::forgot_password(&portal, email, format).await
        }
        Commands::VerifyOtp { otp } => commands::verify_otp(&portal, &otp, format).await,
        Commands::ResendOtp => commands::resend_otp(&portal, format).await,
        Commands::ResetPassword => commands::reset_password(&portal, format).await,
        Commands::Courses => commands::courses(&portal, format).await,
        Commands::Topics => commands::topics(&portal, format).await,
        Commands::Curriculum { command } => match command {
            CurriculumCommands::List => commands::curriculum_list(&portal, format).await,
            CurriculumCommands::Create { course, topics } => {
                commands::curriculum_create(&portal, &course, topics, format).await
            }
            CurriculumCommands::Edit {
                id,
                rename,
                delete,
                add,
            } => {
                let edits = CurriculumEdits {
                    renames: rename,
                    deletes: delete,
                    additions: add,
                };
                commands::curriculum_edit(&portal, &id, edits, format).await
            }
        },
        Commands::Classes { command } => match command {
            ClassCommands::Upcoming { date } => {
                commands::classes_upcoming(&portal, date, format).await
            }
            ClassCommands::Options => commands::classes_options(&portal, format).await,
            ClassCommands::Schedule { topic, date, time } => {
                commands::classes_schedule(&portal, topic, date, &time, format).await
            }
            ClassCommands::Reschedule { id, date, time } => {
                commands::classes_reschedule(&portal, &id, date, &time, format).await
            }
            ClassCommands::Cancel { id, yes } => {
                commands::classes_cancel(&portal, &id, yes, format).await
            }
        },
    }
}

fn load() -> anyhow::Result<(Config, Paths)> {
    let paths = Paths::new()?;
    let config = Config::load(&paths)?;
    Ok((config, paths))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    let (config, paths) = match load() {
        Ok(loaded) => loaded,
        Err(e) => {
            output::print_error(&e.to_string(), &format);
            std::process::exit(1);
        }
    };

    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    init_logging("cli", &level, false);
    debug!(api = %config.api_base_url, "Configuration loaded");

    let result = match Portal::new(&config, &paths) {
        Ok(portal) => run(cli, portal).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        output::print_error(&e.to_string(), &format);
        std::process::exit(1);
    }
}
