use anyhow::{anyhow, ensure, Result};
use chrono::Utc;
use devswipe_client::config::DEFAULT_PAGE_SIZE;
use devswipe_client::feed::SessionIdentity;
use devswipe_client::models::{
    CommentRequest, CreateProjectRequest, InteractionKind, InteractionRequest, LoginRequest,
    ProjectStatus, RegisterRequest, UpdateProjectRequest,
};
use devswipe_client::ApiClient;
use tracing::{info, warn};

/// One call in the smoke sequence. Later steps depend on state left behind
/// by earlier ones (token, project id).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Health,
    Register,
    Login,
    Profile,
    CreateProject,
    GetProject,
    Search,
    Feed,
    Interact,
    AddComment,
    ListComments,
    Stats,
    UpdateProject,
    DeleteProject,
}

impl Step {
    pub const ALL: [Step; 14] = [
        Step::Health,
        Step::Register,
        Step::Login,
        Step::Profile,
        Step::CreateProject,
        Step::GetProject,
        Step::Search,
        Step::Feed,
        Step::Interact,
        Step::AddComment,
        Step::ListComments,
        Step::Stats,
        Step::UpdateProject,
        Step::DeleteProject,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Step::Health => "health check",
            Step::Register => "register",
            Step::Login => "login",
            Step::Profile => "get profile",
            Step::CreateProject => "create project",
            Step::GetProject => "get project",
            Step::Search => "search projects",
            Step::Feed => "get feed",
            Step::Interact => "project interaction",
            Step::AddComment => "add comment",
            Step::ListComments => "list comments",
            Step::Stats => "project stats",
            Step::UpdateProject => "update project",
            Step::DeleteProject => "delete project",
        }
    }
}

/// Throwaway account and project for one run.
struct Fixture {
    username: String,
    email: String,
    password: String,
    project_title: String,
    session_id: String,
    project_id: Option<i64>,
}

impl Fixture {
    fn new() -> Self {
        let stamp = Utc::now().timestamp_millis();
        Self {
            username: format!("smoke_{stamp}"),
            email: format!("smoke_{stamp}@example.com"),
            password: "password123".into(),
            project_title: format!("Smoke project {stamp}"),
            session_id: SessionIdentity::new().ensure(),
            project_id: None,
        }
    }

    fn project_id(&self) -> Result<i64> {
        self.project_id
            .ok_or_else(|| anyhow!("no project was created earlier in this run"))
    }
}

#[derive(Debug, Default)]
pub struct Report {
    results: Vec<(Step, Result<(), String>)>,
}

impl Report {
    fn record(&mut self, step: Step, outcome: Result<(), String>) {
        self.results.push((step, outcome));
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|(_, outcome)| outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Percentage of passed steps; zero for an empty run.
    pub fn success_rate(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.passed() as f64 * 100.0 / self.total() as f64
    }

    pub fn summary(&self) -> String {
        let mut out = String::from("Smoke test summary:\n");
        for (step, outcome) in &self.results {
            match outcome {
                Ok(()) => out.push_str(&format!("  PASS  {}\n", step.name())),
                Err(err) => out.push_str(&format!("  FAIL  {}: {err}\n", step.name())),
            }
        }
        out.push_str(&format!(
            "passed: {}, failed: {}, success rate: {:.1}%",
            self.passed(),
            self.failed(),
            self.success_rate()
        ));
        out
    }
}

/// Runs every step in order. A failed step is recorded and the run goes on.
pub async fn run_all(client: &ApiClient) -> Report {
    let mut fixture = Fixture::new();
    let mut report = Report::default();
    for step in Step::ALL {
        info!(step = step.name(), "running");
        let outcome = run_step(client, &mut fixture, step)
            .await
            .map_err(|err| format!("{err:#}"));
        match &outcome {
            Ok(()) => info!(step = step.name(), "passed"),
            Err(error) => warn!(step = step.name(), %error, "failed"),
        }
        report.record(step, outcome);
    }
    report
}

async fn run_step(client: &ApiClient, fixture: &mut Fixture, step: Step) -> Result<()> {
    match step {
        Step::Health => {
            let health = client.health().await?;
            ensure!(health.status == "ok", "unexpected health status {:?}", health.status);
        }
        Step::Register => {
            let auth = client
                .register(&RegisterRequest {
                    username: fixture.username.clone(),
                    email: fixture.email.clone(),
                    password: fixture.password.clone(),
                    tech_stack: vec!["Rust".into(), "Tokio".into()],
                })
                .await?;
            ensure!(!auth.token.is_empty(), "register returned an empty token");
        }
        Step::Login => {
            client.logout();
            let auth = client
                .login(&LoginRequest {
                    email: fixture.email.clone(),
                    password: fixture.password.clone(),
                })
                .await?;
            ensure!(auth.username == fixture.username, "logged in as {}", auth.username);
            ensure!(client.credentials().is_authenticated(), "token was not stored");
        }
        Step::Profile => {
            let me = client.get_profile().await?;
            ensure!(me.username == fixture.username, "profile belongs to {}", me.username);
        }
        Step::CreateProject => {
            let project = client
                .create_project(&CreateProjectRequest {
                    title: fixture.project_title.clone(),
                    description: "Created by the DevSwipe smoke test.".into(),
                    cover_image: Some("https://via.placeholder.com/400x300".into()),
                    image_urls: vec!["https://via.placeholder.com/400x300?text=1".into()],
                    project_url: Some("https://github.com/devswipe/smoke".into()),
                    status: Some(ProjectStatus::Demo),
                    tags: vec!["Rust".into(), "Testing".into()],
                })
                .await?;
            fixture.project_id = Some(project.id);
        }
        Step::GetProject => {
            let project = client.get_project(fixture.project_id()?).await?;
            ensure!(project.title == fixture.project_title, "got project {:?}", project.title);
        }
        Step::Search => {
            let found = client.search_projects("Smoke", 20, 0).await?;
            info!(count = found.projects.len(), "search results");
        }
        Step::Feed => {
            let feed = client
                .get_feed(1, DEFAULT_PAGE_SIZE, Some(&fixture.session_id))
                .await?;
            info!(count = feed.projects.len(), has_more = feed.has_more, "feed page");
        }
        Step::Interact => {
            client
                .interact(&InteractionRequest {
                    project_id: fixture.project_id()?,
                    kind: InteractionKind::Like,
                    view_duration: 5.0,
                    session_id: fixture.session_id.clone(),
                    structured_feedback: None,
                })
                .await?;
        }
        Step::AddComment => {
            let comment = client
                .add_comment(
                    fixture.project_id()?,
                    &CommentRequest {
                        content: "Nice demo, which stack is the backend on?".into(),
                        parent_id: None,
                        is_technical: true,
                    },
                )
                .await?;
            ensure!(comment.is_technical, "comment lost its technical flag");
        }
        Step::ListComments => {
            let comments = client.comments(fixture.project_id()?, 20, 0).await?;
            ensure!(!comments.is_empty(), "comment list is empty");
        }
        Step::Stats => {
            let stats = client.project_stats(fixture.project_id()?).await?;
            info!(likes = stats.total_likes, views = stats.total_views, "project stats");
        }
        Step::UpdateProject => {
            client
                .update_project(
                    fixture.project_id()?,
                    &UpdateProjectRequest {
                        description: Some("Updated by the DevSwipe smoke test.".into()),
                        status: Some(ProjectStatus::Mvp),
                        ..UpdateProjectRequest::default()
                    },
                )
                .await?;
        }
        Step::DeleteProject => {
            client.delete_project(fixture.project_id()?).await?;
            fixture.project_id = None;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn summary_reports_success_rate() {
        let mut report = Report::default();
        report.record(Step::Health, Ok(()));
        report.record(Step::Register, Ok(()));
        report.record(Step::Login, Err("wrong password".into()));

        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 1);
        let summary = report.summary();
        assert!(summary.contains("FAIL  login: wrong password"));
        assert!(summary.ends_with("passed: 2, failed: 1, success rate: 66.7%"));
    }

    #[test]
    fn empty_run_has_zero_rate() {
        assert_eq!(Report::default().success_rate(), 0.0);
    }

    #[test]
    fn steps_follow_the_dependency_order() {
        let position = |step: Step| Step::ALL.iter().position(|s| *s == step).unwrap();
        assert!(position(Step::Register) < position(Step::Login));
        assert!(position(Step::CreateProject) < position(Step::Interact));
        assert_eq!(Step::ALL.last(), Some(&Step::DeleteProject));
    }

    #[test]
    fn project_steps_need_a_created_project() {
        let fixture = Fixture::new();
        assert!(fixture.project_id().is_err());
        assert!(fixture.session_id.starts_with("session_"));
    }
}
