use crate::messages::Locale;
use crate::store::{SharedStore, API_KEY_KEY, LOCALE_KEY, PROMPT_KEY};

/// Typed view over the independently persisted panel settings.
///
/// Each setter writes its own key immediately; there is no grouped save.
#[derive(Clone)]
pub struct Settings {
    store: SharedStore,
}

impl Settings {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn prompt(&self) -> String {
        self.store.get(PROMPT_KEY).unwrap_or_default()
    }

    pub fn set_prompt(&self, prompt: &str) -> anyhow::Result<()> {
        self.store.set(PROMPT_KEY, prompt)
    }

    /// Stored credential, `None` when unset or blank.
    pub fn credential(&self) -> Option<String> {
        self.store
            .get(API_KEY_KEY)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn set_credential(&self, credential: &str) -> anyhow::Result<()> {
        self.store.set(API_KEY_KEY, credential.trim())
    }

    pub fn locale(&self) -> Locale {
        self.store
            .get(LOCALE_KEY)
            .and_then(|code| Locale::from_code(&code))
            .unwrap_or_default()
    }

    pub fn set_locale(&self, locale: Locale) -> anyhow::Result<()> {
        self.store.set(LOCALE_KEY, locale.code())
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use crate::messages::Locale;
    use crate::store::{KeyValueStore, MemoryStore, SharedStore, LOCALE_KEY};

    #[test]
    fn fields_persist_independently() -> anyhow::Result<()> {
        let store: SharedStore = MemoryStore::shared();
        let settings = Settings::new(store.clone());
        settings.set_prompt("neon skyline")?;
        settings.set_credential("  key-123  ")?;

        let reopened = Settings::new(store);
        assert_eq!(reopened.prompt(), "neon skyline");
        assert_eq!(reopened.credential().as_deref(), Some("key-123"));
        assert_eq!(reopened.locale(), Locale::Vi);
        Ok(())
    }

    #[test]
    fn blank_credential_reads_as_missing() -> anyhow::Result<()> {
        let settings = Settings::new(MemoryStore::shared());
        assert_eq!(settings.credential(), None);
        settings.set_credential("   ")?;
        assert_eq!(settings.credential(), None);
        Ok(())
    }

    #[test]
    fn unknown_stored_locale_uses_default() -> anyhow::Result<()> {
        let memory = MemoryStore::shared();
        let settings = Settings::new(memory.clone());
        settings.set_locale(Locale::Zh)?;
        assert_eq!(settings.locale(), Locale::Zh);

        memory.set(LOCALE_KEY, "klingon")?;
        assert_eq!(settings.locale(), Locale::Vi);
        Ok(())
    }
}
