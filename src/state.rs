use crate::auth::repo::{OtpRepo, UserRepo};
use crate::config::AppConfig;
use crate::content::ContentRepo;
use crate::db::PgStore;
use crate::experience::repo_types::Experience;
use crate::mailer::{self, Mailer};
use crate::memory::{MemoryAuthStore, MemoryContentRepo};
use crate::projects::repo_types::Project;
use crate::skills::repo_types::Skill;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub otps: Arc<dyn OtpRepo>,
    pub projects: Arc<dyn ContentRepo<Project>>,
    pub experience: Arc<dyn ContentRepo<Experience>>,
    pub skills: Arc<dyn ContentRepo<Skill>>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let mailer = mailer::from_config(&config.mail)?;

        match config.database_url.as_deref() {
            Some(url) => {
                let store = Arc::new(PgStore::connect(url).await?);
                store.migrate().await?;
                Ok(Self {
                    config,
                    users: store.clone(),
                    otps: store.clone(),
                    projects: store.clone(),
                    experience: store.clone(),
                    skills: store,
                    mailer,
                })
            }
            None => {
                tracing::warn!("DATA_STORE=memory: using in-memory store, data is lost on restart");
                Ok(Self::in_memory(config, mailer))
            }
        }
    }

    pub fn in_memory(config: Arc<AppConfig>, mailer: Arc<dyn Mailer>) -> Self {
        let auth = Arc::new(MemoryAuthStore::new());
        Self {
            config,
            users: auth.clone(),
            otps: auth,
            projects: Arc::new(MemoryContentRepo::<Project>::new()),
            experience: Arc::new(MemoryContentRepo::<Experience>::new()),
            skills: Arc::new(MemoryContentRepo::<Skill>::new()),
            mailer,
        }
    }
}
