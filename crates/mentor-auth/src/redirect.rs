//! Route protection policy.
//!
//! Decides, from a session snapshot and a route, whether a viewer may stay or
//! must be sent to the login route.

use crate::SessionSnapshot;
use std::collections::HashSet;
use tokio::sync::watch;
use tracing::debug;

pub const LOGIN_ROUTE: &str = "/login";
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// Routes reachable without an identity.
pub const DEFAULT_PUBLIC_ROUTES: [&str; 5] =
    ["/login", "/forgot-password", "/otp", "/reset-password", "/"];

/// Outcome of evaluating a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    Stay,
    Redirect(String),
}

/// What a protected view renders for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectedView {
    /// Session still resolving; show a spinner.
    Loading,
    /// No identity; render nothing while the redirect happens.
    Hidden,
    Visible,
}

/// Redirect policy over an allowlist of public routes.
#[derive(Debug, Clone)]
pub struct RedirectGuard {
    public_routes: HashSet<String>,
}

impl Default for RedirectGuard {
    fn default() -> Self {
        Self::with_public_routes(DEFAULT_PUBLIC_ROUTES)
    }
}

impl RedirectGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_public_routes<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            public_routes: routes
                .into_iter()
                .map(|r| normalize(r.as_ref()))
                .collect(),
        }
    }

    /// Check whether `route` is on the allowlist. Query strings, fragments
    /// and trailing slashes are ignored.
    pub fn is_public(&self, route: &str) -> bool {
        self.public_routes.contains(&normalize(route))
    }

    /// Decide whether the viewer of `route` stays or is redirected.
    ///
    /// Nothing happens while the session is unresolved. Authenticated users
    /// may stay on public routes.
    pub fn evaluate(&self, snapshot: &SessionSnapshot, route: &str) -> RedirectDecision {
        if snapshot.status.is_pending() {
            return RedirectDecision::Stay;
        }

        if snapshot.identity.is_none() && !self.is_public(route) {
            return RedirectDecision::Redirect(LOGIN_ROUTE.to_string());
        }

        RedirectDecision::Stay
    }

    /// Where the root page sends the viewer, once the session is resolved.
    pub fn landing_route(snapshot: &SessionSnapshot) -> Option<&'static str> {
        if snapshot.status.is_pending() {
            return None;
        }
        if snapshot.identity.is_some() {
            Some(DASHBOARD_ROUTE)
        } else {
            Some(LOGIN_ROUTE)
        }
    }

    pub fn protected_view(snapshot: &SessionSnapshot) -> ProtectedView {
        if snapshot.status.is_pending() {
            ProtectedView::Loading
        } else if snapshot.identity.is_none() {
            ProtectedView::Hidden
        } else {
            ProtectedView::Visible
        }
    }

    /// Re-evaluate on every session or route change, calling `navigate` for
    /// each redirect. Returns when either sender is dropped.
    pub async fn run<F>(
        &self,
        mut session_rx: watch::Receiver<SessionSnapshot>,
        mut route_rx: watch::Receiver<String>,
        mut navigate: F,
    ) where
        F: FnMut(String),
    {
        loop {
            let decision = {
                let snapshot = session_rx.borrow_and_update();
                let route = route_rx.borrow_and_update();
                self.evaluate(&snapshot, &route)
            };

            if let RedirectDecision::Redirect(target) = decision {
                debug!(target = %target, "Redirecting");
                navigate(target);
            }

            tokio::select! {
                changed = session_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                changed = route_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

fn normalize(route: &str) -> String {
    let path = route.split(['?', '#']).next().unwrap_or(route);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MentorIdentity, SessionStatus};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn snapshot(status: SessionStatus, signed_in: bool) -> SessionSnapshot {
        SessionSnapshot {
            status,
            identity: signed_in.then(|| MentorIdentity {
                id: "m-1".into(),
                name: "Ada".into(),
                contact_email: "ada@example.edu".into(),
                contact_phone: String::new(),
            }),
        }
    }

    fn redirect_to_login() -> RedirectDecision {
        RedirectDecision::Redirect(LOGIN_ROUTE.to_string())
    }

    #[test]
    fn test_pending_session_never_redirects() {
        let guard = RedirectGuard::new();
        for status in [SessionStatus::Uninitialized, SessionStatus::Loading] {
            assert_eq!(
                guard.evaluate(&snapshot(status, false), "/dashboard"),
                RedirectDecision::Stay
            );
        }
    }

    #[test]
    fn test_anonymous_viewer_redirected_from_protected_routes() {
        let guard = RedirectGuard::new();
        let anon = snapshot(SessionStatus::Unauthenticated, false);

        assert_eq!(guard.evaluate(&anon, "/dashboard"), redirect_to_login());
        assert_eq!(guard.evaluate(&anon, "/addcurriculums"), redirect_to_login());
        assert_eq!(guard.evaluate(&anon, "/login"), RedirectDecision::Stay);
        assert_eq!(guard.evaluate(&anon, "/otp"), RedirectDecision::Stay);
        assert_eq!(guard.evaluate(&anon, "/"), RedirectDecision::Stay);
    }

    #[test]
    fn test_authenticated_viewer_may_stay_on_public_routes() {
        let guard = RedirectGuard::new();
        let user = snapshot(SessionStatus::Authenticated, true);

        assert_eq!(guard.evaluate(&user, "/login"), RedirectDecision::Stay);
        assert_eq!(guard.evaluate(&user, "/scheduleclass"), RedirectDecision::Stay);
    }

    #[test]
    fn test_route_normalization() {
        let guard = RedirectGuard::new();
        assert!(guard.is_public("/login/"));
        assert!(guard.is_public("/reset-password?email=a"));
        assert!(guard.is_public("login"));
        assert!(guard.is_public(""));
        assert!(!guard.is_public("/login/extra"));
    }

    #[test]
    fn test_custom_allowlist() {
        let guard = RedirectGuard::with_public_routes(["/login", "/help"]);
        let anon = snapshot(SessionStatus::Unauthenticated, false);

        assert_eq!(guard.evaluate(&anon, "/help"), RedirectDecision::Stay);
        assert_eq!(guard.evaluate(&anon, "/otp"), redirect_to_login());
    }

    #[test]
    fn test_landing_route_and_protected_view() {
        let loading = snapshot(SessionStatus::Loading, false);
        let anon = snapshot(SessionStatus::Unauthenticated, false);
        let user = snapshot(SessionStatus::Authenticated, true);

        assert_eq!(RedirectGuard::landing_route(&loading), None);
        assert_eq!(RedirectGuard::landing_route(&anon), Some(LOGIN_ROUTE));
        assert_eq!(RedirectGuard::landing_route(&user), Some(DASHBOARD_ROUTE));

        assert_eq!(RedirectGuard::protected_view(&loading), ProtectedView::Loading);
        assert_eq!(RedirectGuard::protected_view(&anon), ProtectedView::Hidden);
        assert_eq!(RedirectGuard::protected_view(&user), ProtectedView::Visible);
    }

    #[tokio::test]
    async fn test_run_redirects_when_session_resolves() {
        let (session_tx, session_rx) = watch::channel(snapshot(SessionStatus::Loading, false));
        let (route_tx, route_rx) = watch::channel("/dashboard".to_string());
        let (nav_tx, mut nav_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            RedirectGuard::new()
                .run(session_rx, route_rx, move |target| {
                    let _ = nav_tx.send(target);
                })
                .await;
        });

        session_tx.send_replace(snapshot(SessionStatus::Unauthenticated, false));
        let target = tokio::time::timeout(Duration::from_secs(5), nav_rx.recv())
            .await
            .unwrap();
        assert_eq!(target.as_deref(), Some(LOGIN_ROUTE));

        route_tx.send_replace("/login".to_string());
        drop(session_tx);
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();

        assert!(nav_rx.try_recv().is_err());
    }
}
