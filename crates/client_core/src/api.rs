use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{
        Activity, Course, CourseId, CourseOutline, Department, DepartmentId, Schedule, ScheduleId,
        StudentRecordId, Teacher, TeacherId,
    },
    protocol::{
        ActivityQuery, CourseQuery, DataEnvelope, MessageResponse, NewActivity, NewCourse,
        NewCourseOutline, NewDepartment, NewSchedule, OutlineQuery, ScheduleQuery, StudentPage,
        StudentPayload, StudentQuery, TeacherQuery,
    },
};
use tracing::{error, info};

use crate::{
    config::{normalize_server_url, ClientConfig},
    error::ClientError,
};

pub type ApiResult<T> = Result<T, ClientError>;

/// Every call the front-ends make against the SRS server.
#[async_trait]
pub trait SrsApi: Send + Sync {
    async fn list_students(&self, query: &StudentQuery) -> ApiResult<StudentPage>;
    async fn create_student(&self, payload: &StudentPayload) -> ApiResult<()>;
    async fn update_student(&self, id: &StudentRecordId, payload: &StudentPayload)
        -> ApiResult<()>;
    async fn delete_student(&self, id: &StudentRecordId) -> ApiResult<()>;
    async fn import_students(&self, filename: &str, bytes: Vec<u8>)
        -> ApiResult<MessageResponse>;

    async fn list_teachers(&self, query: &TeacherQuery) -> ApiResult<Vec<Teacher>>;
    async fn delete_teacher(&self, id: &TeacherId) -> ApiResult<()>;

    async fn list_departments(&self) -> ApiResult<Vec<Department>>;
    async fn create_department(&self, body: &NewDepartment) -> ApiResult<()>;
    async fn delete_department(&self, id: &DepartmentId) -> ApiResult<()>;

    async fn list_courses(&self, query: &CourseQuery) -> ApiResult<Vec<Course>>;
    async fn create_course(&self, body: &NewCourse) -> ApiResult<()>;
    async fn delete_course(&self, id: &CourseId) -> ApiResult<()>;

    async fn list_schedules(&self, query: &ScheduleQuery) -> ApiResult<Vec<Schedule>>;
    async fn create_schedule(&self, body: &NewSchedule) -> ApiResult<()>;
    async fn delete_schedule(&self, id: &ScheduleId) -> ApiResult<()>;

    async fn list_course_outlines(&self, teacher_id: &TeacherId) -> ApiResult<Vec<CourseOutline>>;
    async fn submit_course_outline(&self, body: &NewCourseOutline) -> ApiResult<()>;

    async fn list_activities(&self, query: &ActivityQuery) -> ApiResult<Vec<Activity>>;
    async fn record_activity(&self, body: &NewActivity) -> ApiResult<()>;
}

/// reqwest-backed client. No retries and no client-side timeout.
#[derive(Debug, Clone)]
pub struct SrsClient {
    http: Client,
    server_url: String,
}

impl SrsClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: Client::new(),
            server_url: config.server_url.clone(),
        }
    }

    pub fn with_server_url(server_url: &str) -> ApiResult<Self> {
        let server_url = normalize_server_url(server_url).map_err(|err| {
            ClientError::InvalidUrl {
                url: server_url.to_string(),
                reason: err.to_string(),
            }
        })?;
        Ok(Self {
            http: Client::new(),
            server_url,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.server_url)
    }

    async fn send(&self, label: &'static str, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(|err| {
            error!(request = label, error = %err, "srs: request failed");
            ClientError::from(err)
        })?;
        let status = response.status();
        if status.is_success() {
            info!(request = label, status = status.as_u16(), "srs: request ok");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ClientError::from_response(status.as_u16(), &body);
        error!(request = label, status = status.as_u16(), error = %err, "srs: request rejected");
        Err(err)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        label: &'static str,
        request: RequestBuilder,
    ) -> ApiResult<T> {
        let bytes = self.send(label, request).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn execute(&self, label: &'static str, request: RequestBuilder) -> ApiResult<()> {
        self.send(label, request).await.map(drop)
    }
}

#[async_trait]
impl SrsApi for SrsClient {
    async fn list_students(&self, query: &StudentQuery) -> ApiResult<StudentPage> {
        self.fetch(
            "list_students",
            self.http.get(self.url("/student")).query(query),
        )
        .await
    }

    async fn create_student(&self, payload: &StudentPayload) -> ApiResult<()> {
        self.execute(
            "create_student",
            self.http.post(self.url("/student/add")).json(payload),
        )
        .await
    }

    async fn update_student(
        &self,
        id: &StudentRecordId,
        payload: &StudentPayload,
    ) -> ApiResult<()> {
        self.execute(
            "update_student",
            self.http
                .put(self.url(&format!("/student/{id}")))
                .json(payload),
        )
        .await
    }

    async fn delete_student(&self, id: &StudentRecordId) -> ApiResult<()> {
        self.execute(
            "delete_student",
            self.http.delete(self.url(&format!("/student/{id}"))),
        )
        .await
    }

    async fn import_students(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<MessageResponse> {
        let part = multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = multipart::Form::new().part("file", part);
        self.fetch(
            "import_students",
            self.http.post(self.url("/student/import")).multipart(form),
        )
        .await
    }

    async fn list_teachers(&self, query: &TeacherQuery) -> ApiResult<Vec<Teacher>> {
        let envelope: DataEnvelope<Teacher> = self
            .fetch(
                "list_teachers",
                self.http.get(self.url("/teachers")).query(query),
            )
            .await?;
        Ok(envelope.data)
    }

    async fn delete_teacher(&self, id: &TeacherId) -> ApiResult<()> {
        self.execute(
            "delete_teacher",
            self.http.delete(self.url(&format!("/teachers/{id}"))),
        )
        .await
    }

    async fn list_departments(&self) -> ApiResult<Vec<Department>> {
        self.fetch("list_departments", self.http.get(self.url("/department")))
            .await
    }

    async fn create_department(&self, body: &NewDepartment) -> ApiResult<()> {
        self.execute(
            "create_department",
            self.http.post(self.url("/department/add")).json(body),
        )
        .await
    }

    async fn delete_department(&self, id: &DepartmentId) -> ApiResult<()> {
        self.execute(
            "delete_department",
            self.http.delete(self.url(&format!("/department/{id}"))),
        )
        .await
    }

    async fn list_courses(&self, query: &CourseQuery) -> ApiResult<Vec<Course>> {
        self.fetch(
            "list_courses",
            self.http.get(self.url("/course")).query(query),
        )
        .await
    }

    async fn create_course(&self, body: &NewCourse) -> ApiResult<()> {
        self.execute(
            "create_course",
            self.http.post(self.url("/course/add")).json(body),
        )
        .await
    }

    async fn delete_course(&self, id: &CourseId) -> ApiResult<()> {
        self.execute(
            "delete_course",
            self.http.delete(self.url(&format!("/course/{id}"))),
        )
        .await
    }

    async fn list_schedules(&self, query: &ScheduleQuery) -> ApiResult<Vec<Schedule>> {
        let envelope: DataEnvelope<Schedule> = self
            .fetch(
                "list_schedules",
                self.http.get(self.url("/schedule")).query(query),
            )
            .await?;
        Ok(envelope.data)
    }

    async fn create_schedule(&self, body: &NewSchedule) -> ApiResult<()> {
        self.execute(
            "create_schedule",
            self.http.post(self.url("/schedule/add")).json(body),
        )
        .await
    }

    async fn delete_schedule(&self, id: &ScheduleId) -> ApiResult<()> {
        self.execute(
            "delete_schedule",
            self.http.delete(self.url(&format!("/schedule/{id}"))),
        )
        .await
    }

    async fn list_course_outlines(&self, teacher_id: &TeacherId) -> ApiResult<Vec<CourseOutline>> {
        let query = OutlineQuery {
            teacher_id: teacher_id.clone(),
        };
        self.fetch(
            "list_course_outlines",
            self.http
                .get(self.url("/course-outline/teacher"))
                .query(&query),
        )
        .await
    }

    async fn submit_course_outline(&self, body: &NewCourseOutline) -> ApiResult<()> {
        self.execute(
            "submit_course_outline",
            self.http.post(self.url("/course-outline")).json(body),
        )
        .await
    }

    async fn list_activities(&self, query: &ActivityQuery) -> ApiResult<Vec<Activity>> {
        let envelope: DataEnvelope<Activity> = self
            .fetch(
                "list_activities",
                self.http.get(self.url("/activity")).query(query),
            )
            .await?;
        Ok(envelope.data)
    }

    async fn record_activity(&self, body: &NewActivity) -> ApiResult<()> {
        self.execute(
            "record_activity",
            self.http.post(self.url("/activity")).json(body),
        )
        .await
    }
}
