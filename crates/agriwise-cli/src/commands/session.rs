use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use agriwise_core::config::RootConfig;
use agriwise_core::preferences::Language;
use agriwise_core::session::{Session, SessionPersistence, SessionStore, root_route};
use agriwise_core::user::{User, UserPatch};
use agriwise_infrastructure::{AgriwisePaths, JsonSessionStorage, WriteBehindPersistence};

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Print the current session
    Show,
    /// Sign in with a user and token
    Login(LoginArgs),
    /// Sign out, keeping preferences
    Logout,
    /// Patch the signed-in user's profile
    UpdateUser(UpdateUserArgs),
    /// Set the UI language (swahili, english, kikuyu, luo)
    SetLanguage { code: String },
    /// Set the UI theme (light, dark)
    SetTheme { name: String },
    /// Enable or disable notifications
    SetNotifications {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Enable or disable offline mode (not persisted)
    SetOfflineMode {
        #[arg(action = clap::ArgAction::Set)]
        offline: bool,
    },
    /// Print which root screen would be shown
    Route,
}

/// Optional profile fields shared by `login` and `update-user`.
#[derive(Args, Debug, Default)]
pub struct ProfileArgs {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    /// Farm size (finite number)
    #[arg(long)]
    pub farm_size: Option<f64>,
    /// Comma-separated crop list
    #[arg(long, value_delimiter = ',')]
    pub crops: Option<Vec<String>>,
    #[arg(long, value_parser = parse_language)]
    pub language: Option<Language>,
    #[arg(long)]
    pub avatar: Option<String>,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub token: String,
    #[command(flatten)]
    pub profile: ProfileArgs,
}

#[derive(Args, Debug)]
pub struct UpdateUserArgs {
    /// Must match the signed-in user's id when given
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    /// Remove the current avatar
    #[arg(long, conflicts_with = "avatar")]
    pub clear_avatar: bool,
    #[command(flatten)]
    pub profile: ProfileArgs,
}

fn parse_language(code: &str) -> agriwise_core::Result<Language> {
    Language::parse(code)
}

impl LoginArgs {
    fn into_user(self) -> User {
        let profile = self.profile;
        let mut user = User::new(self.id, self.name);
        if let Some(email) = profile.email {
            user = user.with_email(email);
        }
        if let Some(phone) = profile.phone {
            user = user.with_phone(phone);
        }
        if let Some(location) = profile.location {
            user = user.with_location(location);
        }
        if let Some(farm_size) = profile.farm_size {
            user = user.with_farm_size(farm_size);
        }
        if let Some(crops) = profile.crops {
            user = user.with_crops(crops);
        }
        if let Some(language) = profile.language {
            user = user.with_language(language);
        }
        if let Some(avatar) = profile.avatar {
            user = user.with_avatar(avatar);
        }
        user
    }
}

impl UpdateUserArgs {
    fn into_patch(self) -> UserPatch {
        let profile = self.profile;
        UserPatch {
            id: self.id,
            name: self.name,
            email: profile.email,
            phone: profile.phone,
            location: profile.location,
            farm_size: profile.farm_size,
            crops: profile.crops.map(|crops| crops.into_iter().collect()),
            language: profile.language,
            avatar: if self.clear_avatar {
                Some(None)
            } else {
                profile.avatar.map(Some)
            },
        }
    }
}

/// The store for one CLI invocation, plus the write-behind handle to flush
/// before exit.
pub struct SessionContext {
    store: SessionStore,
    write_behind: Option<Arc<WriteBehindPersistence>>,
}

impl SessionContext {
    /// Opens and rehydrates the store configured by `config`.
    pub fn open(paths: &AgriwisePaths, config: &RootConfig) -> Result<Self> {
        let storage = Arc::new(JsonSessionStorage::from_paths(
            paths,
            &config.storage.namespace,
        )?);
        tracing::debug!(path = %storage.path().display(), "[Session] Using session record");

        let write_behind = if config.persistence.write_behind {
            Some(Arc::new(WriteBehindPersistence::spawn(storage.clone())?))
        } else {
            None
        };
        let persistence: Arc<dyn SessionPersistence> = match &write_behind {
            Some(write_behind) => write_behind.clone(),
            None => storage,
        };

        Ok(Self {
            store: SessionStore::open(persistence),
            write_behind,
        })
    }

    /// Waits for queued writes to reach disk.
    pub async fn finish(&self) -> Result<()> {
        if let Some(write_behind) = &self.write_behind {
            write_behind
                .flush()
                .await
                .context("Failed to flush session record")?;
        }
        Ok(())
    }
}

impl SessionCommand {
    pub fn run(self, ctx: &SessionContext) -> Result<()> {
        let store = &ctx.store;
        let session = match self {
            SessionCommand::Show => store.snapshot(),
            SessionCommand::Login(args) => {
                let token = args.token.clone();
                store.login(args.into_user(), token)?
            }
            SessionCommand::Logout => store.logout()?,
            SessionCommand::UpdateUser(args) => {
                if store.snapshot().user().is_none() {
                    tracing::info!("[Session] No user signed in, nothing to update");
                }
                store.update_user(args.into_patch())?
            }
            SessionCommand::SetLanguage { code } => store.set_language_code(&code)?,
            SessionCommand::SetTheme { name } => store.set_theme_name(&name)?,
            SessionCommand::SetNotifications { enabled } => store.set_notifications(enabled)?,
            SessionCommand::SetOfflineMode { offline } => store.set_offline_mode(offline)?,
            SessionCommand::Route => {
                println!("{}", root_route(&store.snapshot()));
                return Ok(());
            }
        };

        println!("{}", render(&session)?);
        Ok(())
    }
}

/// Pretty JSON of the snapshot with the derived fields added.
fn render(session: &Session) -> Result<String> {
    let mut value = serde_json::to_value(session)?;
    if let Some(object) = value.as_object_mut() {
        object.insert(
            "isAuthenticated".to_string(),
            serde_json::Value::Bool(session.is_authenticated()),
        );
        object.insert(
            "route".to_string(),
            serde_json::Value::String(root_route(session).to_string()),
        );
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_args_build_user() {
        let args = LoginArgs {
            id: "1".to_string(),
            name: "Amina".to_string(),
            token: "tok".to_string(),
            profile: ProfileArgs {
                crops: Some(vec!["maize".to_string(), "kale".to_string()]),
                language: Some(Language::Luo),
                ..ProfileArgs::default()
            },
        };

        let user = args.into_user();
        assert_eq!(user.id, "1");
        assert_eq!(user.language, Language::Luo);
        assert!(user.crops.contains("kale"));
        assert!(user.avatar.is_none());
    }

    #[test]
    fn test_update_args_only_patch_given_fields() {
        let args = UpdateUserArgs {
            id: None,
            name: None,
            clear_avatar: false,
            profile: ProfileArgs {
                email: Some("a@b.com".to_string()),
                ..ProfileArgs::default()
            },
        };

        let patch = args.into_patch();
        assert_eq!(patch, UserPatch::new().with_email("a@b.com"));
    }

    #[test]
    fn test_update_args_clear_avatar() {
        let args = UpdateUserArgs {
            id: None,
            name: None,
            clear_avatar: true,
            profile: ProfileArgs::default(),
        };

        assert_eq!(args.into_patch(), UserPatch::new().clear_avatar());
    }

    #[test]
    fn test_render_adds_derived_fields() {
        let session = Session::rehydrated(None);
        let rendered: serde_json::Value =
            serde_json::from_str(&render(&session).unwrap()).unwrap();

        assert_eq!(rendered["isAuthenticated"], false);
        assert_eq!(rendered["route"], "sign-in");
        assert_eq!(rendered["language"], "swahili");
    }
}
