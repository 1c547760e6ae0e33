pub mod aws_client_config;

use serde::de::DeserializeOwned;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the configuration used by unit and integration tests.
    ///
    /// `.env.test.local` and `.env.test` are layered on top of the plain
    /// `.env` files. Variables are not overridden: the first source to
    /// define a variable wins, and the OS environment always wins.
    pub fn load_test<TConfig>() -> TConfig
    where
        TConfig: DeserializeOwned,
    {
        dotenv::from_filename(".env.test.local").ok();
        dotenv::from_filename(".env.test").ok();
        Self::load()
    }

    /// Loads the default configuration for the process. This is the
    /// configuration used in production.
    pub fn load_default<TConfig>() -> TConfig
    where
        TConfig: DeserializeOwned,
    {
        Self::load()
    }

    fn load<TConfig>() -> TConfig
    where
        TConfig: DeserializeOwned,
    {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env").ok();

        envy::from_env::<TConfig>().expect("Could not load configuration")
    }
}
