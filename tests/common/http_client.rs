use std::time::Duration;

use gapcheck::gateway::payload::{
    DeleteResponse, EvaluateResponse, JobView, SummaryResponse, UploadResponse,
};
use gapcheck::{AnalysisResults, JobStatus};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

pub struct TestClient {
    base_url: String,
    client: Client,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("client should build"),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.expect("request");
        let status = res.status();
        (status, res.json().await.expect("json body"))
    }

    pub async fn upload(&self, filename: &str, body: &str) -> UploadResponse {
        let res = self
            .client
            .post(self.url("/api/upload"))
            .query(&[("filename", filename)])
            .body(body.to_string())
            .send()
            .await
            .expect("upload");
        assert_eq!(res.status(), StatusCode::OK, "upload rejected");
        res.json().await.expect("upload body")
    }

    pub async fn evaluate(&self, job_id: &str, frameworks: &[&str]) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url("/api/evaluate"))
            .json(&json!({ "job_id": job_id, "frameworks": frameworks }))
            .send()
            .await
            .expect("evaluate");
        let status = res.status();
        (status, res.json().await.expect("evaluate body"))
    }

    pub async fn start(&self, job_id: &str, frameworks: &[&str]) -> EvaluateResponse {
        let (status, body) = self.evaluate(job_id, frameworks).await;
        assert_eq!(status, StatusCode::OK, "evaluate failed: {body}");
        serde_json::from_value(body).expect("evaluate response")
    }

    pub async fn job(&self, job_id: &str) -> JobView {
        let (status, body) = self.get_json(&format!("/api/jobs/{job_id}")).await;
        assert_eq!(status, StatusCode::OK, "job lookup failed: {body}");
        serde_json::from_value(body).expect("job view")
    }

    /// Polls until the job reaches `status`, panicking after a few seconds.
    pub async fn wait_for(&self, job_id: &str, status: JobStatus) -> JobView {
        for _ in 0..200 {
            let view = self.job(job_id).await;
            if view.status == status {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("job {job_id} never reached {status}");
    }

    pub async fn results(&self, job_id: &str) -> AnalysisResults {
        let (status, body) = self.get_json(&format!("/api/results/{job_id}")).await;
        assert_eq!(status, StatusCode::OK, "results failed: {body}");
        serde_json::from_value(body).expect("results")
    }

    pub async fn summary(&self, job_id: &str) -> SummaryResponse {
        let (status, body) = self
            .get_json(&format!("/api/results/{job_id}/summary"))
            .await;
        assert_eq!(status, StatusCode::OK, "summary failed: {body}");
        serde_json::from_value(body).expect("summary")
    }

    pub async fn delete(&self, job_id: &str) -> (StatusCode, Option<DeleteResponse>) {
        let res = self
            .client
            .delete(self.url(&format!("/api/jobs/{job_id}")))
            .send()
            .await
            .expect("delete");
        let status = res.status();
        let body = res.json::<Value>().await.expect("delete body");
        (status, serde_json::from_value(body).ok())
    }
}
