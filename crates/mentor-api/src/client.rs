//! HTTP client for the mentor portal's course, curriculum and class endpoints.

use crate::schedule::validate_class_id;
use crate::types::{CoursesResponse, CurriculumsResponse, TopicsResponse, UpcomingResponse};
use crate::{
    ClassOptions, CourseOption, MentorApiResult, RescheduleRequest, ScheduleClassRequest,
    ScheduledClass, TopicOption,
};
use curriculum_editor::{Curriculum, EditSession, NewCurriculumDraft};
use mentor_auth::ApiClient;
use serde_json::Value;

const COURSES_PATH: &str = "/mentor/courses";
const TOPICS_PATH: &str = "/mentor/gettopics";
const CREATE_CURRICULUM_PATH: &str = "/course/createcurriculum";
const MY_CURRICULUMS_PATH: &str = "/course/my-curriculums";
const UPDATE_CURRICULUM_PATH: &str = "/course/update-curriculum";
const CLASS_OPTIONS_PATH: &str = "/class/csoptions";
const SCHEDULE_CLASS_PATH: &str = "/class/schedule-class";
const UPCOMING_CLASSES_PATH: &str = "/class/mentorupcoming";
const RESCHEDULE_PATH: &str = "/class/reschedule";

/// Typed endpoints over an authenticated [`ApiClient`].
///
/// Every call goes through the client's refresh-and-replay path, so an
/// expired access token is renewed transparently.
#[derive(Clone)]
pub struct MentorApi {
    api: ApiClient,
}

impl MentorApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // ==========================================
    // Courses and topics
    // ==========================================

    /// Courses assigned to the signed-in mentor.
    pub async fn courses(&self) -> MentorApiResult<Vec<CourseOption>> {
        tracing::debug!("Fetching assigned courses");

        let response: CoursesResponse = self.api.get(COURSES_PATH).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch courses");
            e
        })?;

        tracing::debug!("Fetched {} courses", response.data.len());
        Ok(response.data)
    }

    /// Topics the mentor teaches.
    pub async fn topics(&self) -> MentorApiResult<Vec<TopicOption>> {
        tracing::debug!("Fetching topics");

        let response: TopicsResponse = self.api.get(TOPICS_PATH).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch topics");
            e
        })?;

        Ok(response.topics)
    }

    // ==========================================
    // Curriculums
    // ==========================================

    /// The mentor's curriculums. An empty body reads as no curriculums.
    pub async fn my_curriculums(&self) -> MentorApiResult<Vec<Curriculum>> {
        tracing::debug!("Fetching curriculums");

        let response: Option<CurriculumsResponse> =
            self.api.get(MY_CURRICULUMS_PATH).await.map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch curriculums");
                e
            })?;

        let curriculums = CurriculumsResponse::into_vec(response);
        tracing::debug!("Fetched {} curriculums", curriculums.len());
        Ok(curriculums)
    }

    /// Validate a draft and create the curriculum.
    ///
    /// # Arguments
    /// * `draft` - Course selection and topic names; rejected locally when a
    ///   course is missing or topics are blank or duplicated
    pub async fn create_curriculum(&self, draft: &NewCurriculumDraft) -> MentorApiResult<Value> {
        let request = draft.to_request()?;

        tracing::info!(
            course_id = %request.course_id,
            topics = request.topics.len(),
            "Creating curriculum"
        );

        let created: Value = self
            .api
            .post(CREATE_CURRICULUM_PATH, &request)
            .await
            .map_err(|e| {
                tracing::error!(course_id = %request.course_id, error = %e, "Failed to create curriculum");
                e
            })?;
        Ok(created)
    }

    /// Save an edit session.
    ///
    /// Duplicate names are rejected locally and nothing is sent.
    pub async fn update_curriculum(&self, session: &EditSession) -> MentorApiResult<Value> {
        let request = session.prepare_save()?;

        let updated: Value = self
            .api
            .put(UPDATE_CURRICULUM_PATH, &request)
            .await
            .map_err(|e| {
                tracing::error!(curriculum_id = %request.course_id, error = %e, "Failed to update curriculum");
                e
            })?;

        tracing::info!(curriculum_id = %request.course_id, "Curriculum updated");
        Ok(updated)
    }

    // ==========================================
    // Classes
    // ==========================================

    /// Courses and topics available in the class scheduler.
    pub async fn class_options(&self) -> MentorApiResult<ClassOptions> {
        let options: Option<ClassOptions> =
            self.api.get(CLASS_OPTIONS_PATH).await.map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch class options");
                e
            })?;
        Ok(options.unwrap_or_default())
    }

    /// Schedule a new class.
    ///
    /// # Arguments
    /// * `request` - Built by [`crate::ClassScheduleDraft::to_request`]
    pub async fn schedule_class(&self, request: &ScheduleClassRequest) -> MentorApiResult<Value> {
        tracing::info!(topic = %request.topic, at = %request.schedule, "Scheduling class");

        let scheduled: Value = self
            .api
            .post(SCHEDULE_CLASS_PATH, request)
            .await
            .map_err(|e| {
                tracing::error!(topic = %request.topic, error = %e, "Failed to schedule class");
                e
            })?;
        Ok(scheduled)
    }

    /// Upcoming classes for the mentor, in the order the server sends them.
    pub async fn upcoming_classes(&self) -> MentorApiResult<Vec<ScheduledClass>> {
        tracing::debug!("Fetching upcoming classes");

        let response: Option<UpcomingResponse> =
            self.api.get(UPCOMING_CLASSES_PATH).await.map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch upcoming classes");
                e
            })?;

        Ok(response.map(UpcomingResponse::into_vec).unwrap_or_default())
    }

    /// Move a class to a new time.
    ///
    /// # Arguments
    /// * `request` - Built by [`crate::ClassScheduleDraft::to_reschedule`]
    pub async fn reschedule_class(&self, request: &RescheduleRequest) -> MentorApiResult<Value> {
        tracing::info!(class_id = %request.class_id, at = %request.schedule, "Rescheduling class");

        let updated: Value = self
            .api
            .patch(RESCHEDULE_PATH, request)
            .await
            .map_err(|e| {
                tracing::error!(class_id = %request.class_id, error = %e, "Failed to reschedule class");
                e
            })?;
        Ok(updated)
    }

    /// Cancel a class.
    ///
    /// # Arguments
    /// * `class_id` - Server id of the class
    pub async fn cancel_class(&self, class_id: &str) -> MentorApiResult<Value> {
        let class_id = validate_class_id(class_id)?;

        let path = format!("/class/{}/cancel", class_id);
        let cancelled: Value = self.api.delete(&path).await.map_err(|e| {
            tracing::error!(class_id = %class_id, error = %e, "Failed to cancel class");
            e
        })?;

        tracing::info!(class_id = %class_id, "Class cancelled");
        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassScheduleDraft, MentorApiError, ScheduleError};
    use chrono::{DateTime, Utc};
    use curriculum_editor::CurriculumError;
    use mentor_auth::ApiError;
    use portal_storage::{MemoryStorage, TokenPair, TokenStore};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn setup(server: &MockServer) -> MentorApi {
        let tokens = Arc::new(TokenStore::new(Box::new(MemoryStorage::new())));
        tokens
            .save(&TokenPair::new("access-1", "refresh-1"))
            .unwrap();
        let api = ApiClient::new(format!("{}/api", server.uri()), tokens).unwrap();
        MentorApi::new(api)
    }

    fn now() -> DateTime<Utc> {
        "2026-10-18T08:00:00Z".parse().unwrap()
    }

    #[tokio::test]
    async fn test_courses_unwraps_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/mentor/courses"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "_id": "course-1", "name": "Mathematics" },
                    { "_id": "course-2", "name": "Physics" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let courses = setup(&server).courses().await.unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[1].name, "Physics");
    }

    #[tokio::test]
    async fn test_topics_unwraps_topics() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/mentor/gettopics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "topics": [{ "_id": "t1", "name": "Algebra" }]
            })))
            .mount(&server)
            .await;

        let topics = setup(&server).topics().await.unwrap();
        assert_eq!(topics[0].id, "t1");
    }

    #[tokio::test]
    async fn test_my_curriculums_accepts_single_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/course/my-curriculums"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": "c1",
                "course_name": "Mathematics",
                "curriculum": [{ "_id": "t1", "topic": "Algebra", "status": true }]
            })))
            .mount(&server)
            .await;

        let curriculums = setup(&server).my_curriculums().await.unwrap();
        assert_eq!(curriculums.len(), 1);
        assert_eq!(curriculums[0].completed_count(), 1);
    }

    #[tokio::test]
    async fn test_my_curriculums_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/course/my-curriculums"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        assert!(setup(&server).my_curriculums().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_curriculum_sends_trimmed_topics() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/course/createcurriculum"))
            .and(body_json(json!({ "courseId": "course-1", "topics": ["Algebra", "Geometry"] })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "_id": "c9" })))
            .expect(1)
            .mount(&server)
            .await;

        let draft = NewCurriculumDraft::with_topics("course-1", ["Algebra ", " Geometry"]);
        let created = setup(&server).create_curriculum(&draft).await.unwrap();
        assert_eq!(created["_id"], "c9");
    }

    #[tokio::test]
    async fn test_create_curriculum_validates_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/course/createcurriculum"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let draft = NewCurriculumDraft::with_topics("course-1", ["Algebra", "ALGEBRA"]);
        let err = setup(&server).create_curriculum(&draft).await.unwrap_err();
        assert!(matches!(
            err,
            MentorApiError::Curriculum(CurriculumError::DuplicateTopics { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_curriculum_surfaces_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/course/createcurriculum"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({ "message": "Curriculum already exists" })),
            )
            .mount(&server)
            .await;

        let draft = NewCurriculumDraft::with_topics("course-1", ["Algebra"]);
        let err = setup(&server).create_curriculum(&draft).await.unwrap_err();
        assert_eq!(
            err.user_message("Unable to save curriculum"),
            "Curriculum already exists"
        );
    }

    #[tokio::test]
    async fn test_update_curriculum_sends_reconciled_payload() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/course/update-curriculum"))
            .and(body_json(json!({
                "courseId": "c1",
                "curriculum": [
                    { "_id": "t1", "topic": "Linear Algebra", "status": false },
                    { "topic": "Calculus", "status": false }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
            .expect(1)
            .mount(&server)
            .await;

        let curriculum: Curriculum = serde_json::from_value(json!({
            "_id": "c1",
            "course_name": "Mathematics",
            "curriculum": [
                { "_id": "t1", "topic": "Algebra", "status": false },
                { "_id": "t2", "topic": "Geometry", "status": false }
            ]
        }))
        .unwrap();

        let mut session = EditSession::begin(&curriculum);
        session.rename_topic("t1", "Linear Algebra");
        session.toggle_delete("t2");
        let added = session.add_topic();
        session.rename_topic(&added, "Calculus");

        setup(&server).update_curriculum(&session).await.unwrap();
    }

    #[tokio::test]
    async fn test_class_options_defaults_missing_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/class/csoptions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "topics": [{ "_id": "t1", "name": "Algebra" }]
            })))
            .mount(&server)
            .await;

        let options = setup(&server).class_options().await.unwrap();
        assert!(options.courses.is_empty());
        assert_eq!(options.topics.len(), 1);
    }

    #[tokio::test]
    async fn test_schedule_class() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/class/schedule-class"))
            .and(body_json(json!({ "topic": "t1", "schedule": "2026-10-20T12:00:00Z" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "_id": "k1" })))
            .expect(1)
            .mount(&server)
            .await;

        let mut draft = ClassScheduleDraft::new();
        draft.select_topic("t1");
        draft.select_date("2026-10-20".parse().unwrap());
        let request = draft.to_request(&Utc, now()).unwrap();

        let scheduled = setup(&server).schedule_class(&request).await.unwrap();
        assert_eq!(scheduled["_id"], "k1");
    }

    #[tokio::test]
    async fn test_upcoming_classes_wrapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/class/mentorupcoming"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "classes": [
                    { "_id": "k1", "topic": "Algebra", "course_name": "Mathematics",
                      "scheduledAt": "2026-10-20T12:00:00Z", "status": "scheduled" }
                ]
            })))
            .mount(&server)
            .await;

        let classes = setup(&server).upcoming_classes().await.unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].course_name.as_deref(), Some("Mathematics"));
    }

    #[tokio::test]
    async fn test_reschedule_and_cancel() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/class/reschedule"))
            .and(body_json(json!({ "classId": "k1", "schedule": "2026-10-21T15:30:00Z" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/class/k1/cancel"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let api = setup(&server);

        let mut draft = ClassScheduleDraft::new();
        draft.select_date("2026-10-21".parse().unwrap());
        draft.set_time("15:30");
        let request = draft.to_reschedule("k1", &Utc, now()).unwrap();
        api.reschedule_class(&request).await.unwrap();

        api.cancel_class("k1").await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_unknown_class() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/class/missing/cancel"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let api = setup(&server);
        let err = api.cancel_class("missing").await.unwrap_err();
        assert!(matches!(err, MentorApiError::Api(ApiError::NotFound(_))));

        let err = api.cancel_class(" ").await.unwrap_err();
        assert!(matches!(
            err,
            MentorApiError::Schedule(ScheduleError::MissingClassId)
        ));
    }

    #[tokio::test]
    async fn test_cancel_rejects_ids_that_leave_the_class_path() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/mentor-auth/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hit": "profile" })))
            .expect(0)
            .mount(&server)
            .await;

        let err = setup(&server)
            .cancel_class("../mentor-auth/profile?")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MentorApiError::Schedule(ScheduleError::InvalidClassId(_))
        ));
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_for_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/mentor/courses"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/mentor-auth/refresh"))
            .and(body_json(json!({ "refreshToken": "refresh-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": "access-2",
                "refreshToken": "refresh-2"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/mentor/courses"))
            .and(header("authorization", "Bearer access-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;

        assert!(setup(&server).courses().await.unwrap().is_empty());
    }
}
