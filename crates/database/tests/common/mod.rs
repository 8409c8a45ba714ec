#![allow(dead_code)]

use chrono::{Duration, NaiveDateTime, Timelike, Utc};
use database::entities::{
    article, article_image, certificate, club, competition, competition_registration,
    competition_team_member, event, event_registration, formation, formation_registration, media,
    module, module_completion, reservation, user,
};
use database::services::{
    account::AccountService, certificate::Issuer, formation::FormationService,
    module::ModuleService,
};
use mailer::{MemoryMailer, Notifier};
use models::forms::{FormationForm, ModuleForm, ProfileForm};
use models::status::PublicationStatus;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema,
    sea_query::{Index, IndexCreateStatement},
};
use std::sync::Arc;
use storage::{LocalStorage, Upload};
use tempfile::TempDir;

pub struct TestContext {
    pub db: DatabaseConnection,
    pub storage: LocalStorage,
    pub mailer: Arc<MemoryMailer>,
    pub notifier: Notifier,
    _root: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        create_schema(&db).await;

        let root = TempDir::new().unwrap();
        let storage = LocalStorage::open(root.path(), "http://localhost:3000")
            .await
            .unwrap();
        let mailer = Arc::new(MemoryMailer::new());
        let notifier = Notifier::new(mailer.clone(), "no-reply@center.test", "admin@center.test");

        Self {
            db,
            storage,
            mailer,
            notifier,
            _root: root,
        }
    }

    pub fn issuer(&self) -> Issuer<'_> {
        Issuer {
            storage: &self.storage,
            notifier: &self.notifier,
            public_url: "http://localhost:3000",
        }
    }

    pub async fn student(&self, name: &str) -> user::Model {
        let form = ProfileForm {
            name: name.to_owned(),
            email: format!("{}@univ.test", name.to_lowercase()),
        };
        AccountService::save_profile(&self.db, &format!("sub-{name}"), form, false)
            .await
            .unwrap()
    }

    /// A published formation with `modules` modules, in order
    pub async fn formation(&self, title: &str, modules: usize) -> (formation::Model, Vec<module::Model>) {
        let formation = FormationService::create(
            &self.db,
            &self.storage,
            formation_form(title, Some(PublicationStatus::Published)),
            None,
        )
        .await
        .unwrap();

        let mut created = Vec::new();
        for n in 0..modules {
            let module = ModuleService::create(
                &self.db,
                &self.storage,
                formation.id,
                ModuleForm {
                    title: format!("Module {}", n + 1),
                    description: "Contenu du module".to_owned(),
                    content: None,
                    position: None,
                },
                None,
            )
            .await
            .unwrap();
            created.push(module);
        }
        (formation, created)
    }
}

pub fn formation_form(title: &str, status: Option<PublicationStatus>) -> FormationForm {
    FormationForm {
        title: title.to_owned(),
        description: "Initiation aux outils numériques".to_owned(),
        level: Some("débutant".to_owned()),
        duration_hours: Some(12),
        status,
    }
}

pub fn upload(name: &str) -> Upload {
    Upload {
        file_name: name.to_owned(),
        content_type: Some("image/png".to_owned()),
        bytes: b"image".to_vec(),
    }
}

/// `days` from now, at second precision
pub fn in_days(days: i64) -> NaiveDateTime {
    let at = Utc::now().naive_utc() + Duration::days(days);
    at.with_nanosecond(0).unwrap_or(at)
}

async fn create_schema(db: &DatabaseConnection) {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    macro_rules! create {
        ($($entity:path),+ $(,)?) => {
            $(
                db.execute(backend.build(&schema.create_table_from_entity($entity)))
                    .await
                    .unwrap();
            )+
        };
    }
    create!(
        user::Entity,
        formation::Entity,
        module::Entity,
        module_completion::Entity,
        formation_registration::Entity,
        event::Entity,
        event_registration::Entity,
        competition::Entity,
        competition_registration::Entity,
        competition_team_member::Entity,
        reservation::Entity,
        certificate::Entity,
        article::Entity,
        article_image::Entity,
        media::Entity,
        club::Entity,
    );

    for index in unique_pairs() {
        db.execute(backend.build(&index)).await.unwrap();
    }
}

/// The composite unique indexes the migrations create
fn unique_pairs() -> Vec<IndexCreateStatement> {
    macro_rules! pair {
        ($name:literal, $table:ident, $a:ident, $b:ident) => {
            Index::create()
                .name($name)
                .table($table::Entity)
                .col($table::Column::$a)
                .col($table::Column::$b)
                .unique()
                .to_owned()
        };
    }

    vec![
        pair!("idx_completion_pair", module_completion, StudentId, ModuleId),
        pair!("idx_formation_registration_pair", formation_registration, StudentId, FormationId),
        pair!("idx_event_registration_pair", event_registration, EventId, UserId),
        pair!("idx_competition_registration_pair", competition_registration, CompetitionId, UserId),
        pair!("idx_certificate_pair", certificate, StudentId, FormationId),
    ]
}
