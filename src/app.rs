use crate::cli::{Args, Command, ConfigAction};
use crate::compare::{
    sort_view, ComparisonEntry, SortColumn, SortDirection, CONNECTION_ERROR_MESSAGE,
};
use crate::config::{self, Config};
use crate::models::{EntryRowModel, ShelvesetModel};
use crate::session::{ComparisonSession, NotificationLevel, SessionEvent};
use crate::vcs::{self, GitShelveStore, Shelveset, VersionControl};
use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

pub struct App {
    session: ComparisonSession<GitShelveStore>,
    config: Config,
    command: Option<Command>,
    failed: Rc<Cell<bool>>,
}

/// JSON shape of `compare --json`
#[derive(Serialize)]
struct CompareReport<'a> {
    first: &'a str,
    second: &'a str,
    total: usize,
    matching: usize,
    different: usize,
    summary: &'a str,
    filter: &'a str,
    files: Vec<&'a ComparisonEntry>,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let repo = args.repo.unwrap_or_else(|| PathBuf::from("."));
        let backend = match GitShelveStore::discover(&repo) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::debug!(repo = %repo.display(), error = %e, "no shelveset repository");
                None
            }
        };

        let mut session = ComparisonSession::new(backend);
        let failed = Rc::new(Cell::new(false));
        let failed_flag = Rc::clone(&failed);
        session.subscribe(move |event| {
            if let SessionEvent::Notification { level, message } = event {
                match level {
                    NotificationLevel::Info => eprintln!("{}", message),
                    NotificationLevel::Error => {
                        failed_flag.set(true);
                        eprintln!("Error: {}", message);
                    }
                }
            }
        });

        Ok(Self {
            session,
            config: config::load(),
            command: args.command,
            failed,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let command = self
            .command
            .take()
            .ok_or_else(|| anyhow!("No command given; see --help"))?;

        match command {
            Command::List { user, second_user } => self.list(user, second_user),
            Command::Compare {
                first,
                second,
                filter,
                sort,
                desc,
                json,
            } => {
                let direction = if desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                };
                self.compare(&first, &second, filter, sort.into(), direction, json)
            }
            Command::Details { shelveset } => self.details(&shelveset),
            Command::Shelve { name, rev, message } => self.shelve(&name, &rev, message.as_deref()),
            Command::Config { action } => self.configure(action),
        }
    }

    fn backend(&self) -> Result<&GitShelveStore> {
        self.session
            .backend()
            .ok_or_else(|| anyhow!(CONNECTION_ERROR_MESSAGE))
    }

    fn list(&mut self, user: Option<String>, second_user: Option<String>) -> Result<()> {
        let user = user.or_else(|| {
            Some(self.config.default_user.clone()).filter(|u| !u.is_empty())
        });
        let second_user = if self.config.two_users_view {
            second_user
        } else {
            if second_user.is_some() {
                tracing::warn!("two_users_view is off, ignoring --second-user");
            }
            None
        };

        if !self
            .session
            .refresh_shelvesets(user.as_deref(), second_user.as_deref())
        {
            bail!("Could not list shelvesets");
        }

        let limit = match self.config.max_shelvesets {
            0 => usize::MAX,
            n => n,
        };
        for shelveset in self.session.shelvesets().iter().take(limit) {
            println!("{}", ShelvesetModel::from(shelveset));
        }

        Ok(())
    }

    fn resolve(&self, spec: &str) -> Option<Shelveset> {
        let backend = self.session.backend()?;
        match vcs::find_shelveset(backend, spec) {
            Ok(shelveset) => Some(shelveset),
            Err(e) => {
                eprintln!("Warning: {}", e);
                None
            }
        }
    }

    fn compare(
        &mut self,
        first: &str,
        second: &str,
        filter: Option<String>,
        column: SortColumn,
        direction: SortDirection,
        json: bool,
    ) -> Result<()> {
        let first = self.resolve(first);
        let second = self.resolve(second);

        if !self.session.compare(first.as_ref(), second.as_ref()) || self.failed.get() {
            bail!("Comparison failed");
        }

        self.session.set_filter(filter.unwrap_or_default());
        let mut files = self.session.files();
        sort_view(&mut files, column, direction);
        let result = self.session.result();

        if json {
            let report = CompareReport {
                first: &result.first_name,
                second: &result.second_name,
                total: result.total,
                matching: result.matching,
                different: result.different,
                summary: &result.summary,
                filter: self.session.filter(),
                files,
            };
            let out = serde_json::to_string_pretty(&report).context("Failed to encode result")?;
            println!("{}", out);
            return Ok(());
        }

        if !result.first_name.is_empty() {
            println!("{} <> {}", result.first_name, result.second_name);
        }
        for entry in &files {
            println!("{}", EntryRowModel::from(*entry));
        }
        if files.len() != result.entries.len() {
            println!(
                "({} of {} files shown, filter \"{}\")",
                files.len(),
                result.entries.len(),
                self.session.filter()
            );
        }
        println!("{}", result.summary);

        Ok(())
    }

    fn details(&self, spec: &str) -> Result<()> {
        let backend = self.backend()?;
        let shelveset = vcs::find_shelveset(backend, spec)?;
        let changes = backend
            .query_shelved_changes(&shelveset)
            .with_context(|| format!("Failed to read {}", shelveset.qualified_name()))?;

        println!("{}", ShelvesetModel::from(&shelveset));
        for change in &changes {
            println!(
                "  {:<7} {}  {}",
                change.change_type.as_str(),
                change.item_id,
                change.server_path()
            );
        }
        Ok(())
    }

    fn shelve(&self, name: &str, rev: &str, message: Option<&str>) -> Result<()> {
        let shelveset = self.backend()?.shelve(name, rev, message)?;
        println!("Shelved {}", shelveset.qualified_name());
        Ok(())
    }

    fn configure(&mut self, action: ConfigAction) -> Result<()> {
        match action {
            ConfigAction::Show => {
                if let Some(path) = config::config_path() {
                    println!("# {}", path.display());
                }
                print!("{}", toml::to_string_pretty(&self.config)?);
            }
            ConfigAction::Set { key, value } => {
                self.config.set(&key, &value)?;
                config::save(&self.config).context("Could not save settings")?;
            }
        }
        Ok(())
    }
}
