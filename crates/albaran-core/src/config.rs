/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize`; field names map to upper-case
/// env vars (`database_url` reads `DATABASE_URL`). Use `#[serde(default)]`
/// for optional settings.
///
/// # Panics
///
/// [`Config::from_env`] panics if a required env var is missing or cannot be
/// deserialized. Call it once at startup.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> Self {
        match Self::try_from_env() {
            Ok(config) => config,
            Err(e) => panic!("failed to load config from environment: {e}"),
        }
    }

    /// Non-panicking variant of [`Config::from_env`].
    fn try_from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Load from an explicit `(NAME, value)` list instead of the process env.
    fn from_iter<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }
}
