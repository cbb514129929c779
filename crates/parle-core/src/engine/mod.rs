mod dispatch;
mod turn;

use crate::Result;
use crate::capture::Captures;
use crate::config::{Config, Directories, FileSettings, SettingsStore, UserSettings};
use crate::context::DialogueContext;
use crate::extension::{Extension, ExtensionContext, ExtensionRegistry};
use crate::propositions::PropositionIndex;
use crate::substitute::{Clock, RuntimeValues, SystemClock, substitute};
use parle_types::{EngineEvent, EngineUpdate};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

/// Intent matching and dialogue engine
pub struct Engine {
    config: Config,
    settings: Box<dyn SettingsStore>,
    extensions: ExtensionRegistry,
    state: EngineState,
    rng: Box<dyn RngCore>,
    clock: Box<dyn Clock>,

    /// Channel to send updates to the host
    update_tx: UnboundedSender<EngineUpdate>,
}

/// State carried across turns
#[derive(Debug, Default)]
struct EngineState {
    context: DialogueContext,
    propositions: PropositionIndex,
}

/// Placeholder values read from the current config, settings and clock.
fn runtime_values<'a>(
    config: &'a Config,
    settings: &'a UserSettings,
    clock: &dyn Clock,
) -> RuntimeValues<'a> {
    RuntimeValues {
        user_name: &settings.user_name,
        propositions_enabled: settings.propositions_enabled,
        enabled_label: &config.locale.enabled,
        disabled_label: &config.locale.disabled,
        now: clock.now(),
        locale: config.locale.time_locale(),
    }
}

impl Engine {
    /// Create an engine with no extensions.
    /// Returns the engine and a receiver for its updates.
    #[must_use]
    pub fn new(
        config: Config,
        settings: Box<dyn SettingsStore>,
    ) -> (Self, UnboundedReceiver<EngineUpdate>) {
        let rng: Box<dyn RngCore> = match config.engine.rng_seed {
            Some(seed) => {
                debug!("Using seeded reply selection ({seed})");
                Box::new(ChaCha8Rng::seed_from_u64(seed))
            }
            None => Box::new(StdRng::from_entropy()),
        };

        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                config,
                settings,
                extensions: ExtensionRegistry::default(),
                state: EngineState::default(),
                rng,
                clock: Box::new(SystemClock),
                update_tx,
            },
            update_rx,
        )
    }

    /// Create an engine from the config and settings files under `dirs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created or either file
    /// fails to load.
    pub fn open(dirs: &Directories) -> Result<(Self, UnboundedReceiver<EngineUpdate>)> {
        dirs.ensure_exists()?;
        let config = Config::load(&dirs.config_file)?;
        let settings = FileSettings::open(&dirs.settings_file)?;
        Ok(Self::new(config, Box::new(settings)))
    }

    /// Replace the random source used for reply and suggestion selection.
    #[must_use]
    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Replace the clock read by `?date`, `?hour` and `?dt`.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn settings(&self) -> &UserSettings {
        self.settings.settings()
    }

    /// Pending follow-up, if any.
    #[must_use]
    pub fn context(&self) -> &DialogueContext {
        &self.state.context
    }

    #[must_use]
    pub fn propositions(&self) -> &PropositionIndex {
        &self.state.propositions
    }

    /// Register an extension after those already present.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateExtension` if the id is already registered.
    pub fn register(&mut self, extension: Box<dyn Extension>) -> Result<()> {
        let entry = self.extensions.register(extension)?;
        let seed = entry.extension.suggestion_seed();
        self.state.propositions.add_seed(&seed, self.rng.as_mut());
        Ok(())
    }

    /// Remove an extension. Any pending follow-up is dropped and the
    /// suggestions are rebuilt from the remaining extensions.
    ///
    /// # Errors
    ///
    /// Returns `Error::ExtensionNotFound` if no extension has that id.
    pub fn unregister(&mut self, id: &str) -> Result<()> {
        self.extensions.unregister(id)?;
        self.state.context.clear();
        self.rebuild_propositions();
        Ok(())
    }

    /// Replace the whole extension set, keeping the given order.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateExtension` if two extensions share an id;
    /// those registered before the duplicate stay registered.
    pub fn replace_extensions(&mut self, extensions: Vec<Box<dyn Extension>>) -> Result<()> {
        info!("Replacing extension set ({} extensions)", extensions.len());
        self.extensions.clear();
        self.state.context.clear();
        self.state.propositions.clear();

        let result = extensions
            .into_iter()
            .try_for_each(|extension| self.register(extension));

        let updates = self.state.propositions.show_base();
        self.send_updates(updates);
        result
    }

    /// Registered extension ids in registration order.
    #[must_use]
    pub fn extension_ids(&self) -> Vec<String> {
        self.extensions.ids().map(ToString::to_string).collect()
    }

    /// Announce every registered extension to the host.
    pub fn list_extensions(&self) {
        for id in self.extensions.ids() {
            self.send_update(EngineUpdate::ExtensionFound { id: id.to_string() });
        }
    }

    /// Filter shown suggestions against the current input.
    pub fn text_changed(&mut self, text: &str) {
        let updates = self.state.propositions.text_changed(text);
        self.send_updates(updates);
    }

    /// Reset shown suggestions to the base set.
    pub fn show_base_propositions(&mut self) {
        let updates = self.state.propositions.show_base();
        self.send_updates(updates);
    }

    /// Deliver a view-layer message to one extension.
    ///
    /// # Errors
    ///
    /// Returns `Error::ExtensionNotFound` if no extension has that id.
    pub fn send_message_to_extension(&self, extension_id: &str, message: &str) -> Result<()> {
        let entry = self
            .extensions
            .get(extension_id)
            .ok_or_else(|| crate::Error::ExtensionNotFound(extension_id.to_string()))?;

        debug!("Message for {}: {}", extension_id, message);
        let ctx = ExtensionContext::new(extension_id, self.update_tx.clone());
        entry.extension.message_received(message, &ctx);
        Ok(())
    }

    /// Process a host event - updates are sent via channel
    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::MessageSubmitted { text } => self.process(&text),
            EngineEvent::TextChanged { text } => self.text_changed(&text),
            EngineEvent::ActionTriggered { action } => self.execute_action(&action),
            EngineEvent::ShowBasePropositions => self.show_base_propositions(),
            EngineEvent::ListExtensions => self.list_extensions(),
            EngineEvent::MessageToExtension {
                extension_id,
                message,
            } => {
                if let Err(e) = self.send_message_to_extension(&extension_id, &message) {
                    warn!("Dropping message: {}", e);
                }
            }
        }
    }

    fn rebuild_propositions(&mut self) {
        self.state.propositions.clear();
        for entry in self.extensions.iter() {
            let seed = entry.extension.suggestion_seed();
            self.state.propositions.add_seed(&seed, self.rng.as_mut());
        }

        let updates = self.state.propositions.show_base();
        self.send_updates(updates);
    }

    /// Expand a template against live settings and the clock.
    fn expand(&self, template: &str, captures: &Captures) -> String {
        let values = runtime_values(&self.config, self.settings.settings(), self.clock.as_ref());
        substitute(template, captures, &values)
    }

    fn send_update(&self, update: EngineUpdate) {
        if let Err(e) = self.update_tx.send(update) {
            error!("Failed to send update: {}", e);
        }
    }

    fn send_updates(&self, updates: Vec<EngineUpdate>) {
        for update in updates {
            self.send_update(update);
        }
    }
}
