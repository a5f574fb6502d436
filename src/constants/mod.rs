use crate::{api::error, modules::friend::model::{FriendConstraints, PairOrdering}};

#[derive(Debug, Clone)]
pub struct Env {
    pub database_url: String,
    pub database_max_connections: u32,
    pub pair_ordering: PairOrdering,
    pub allow_self_pairs: bool,
}

impl Env {
    pub fn new() -> Result<Self, error::SystemError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, error::SystemError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://friendgraph.db".to_string());

        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse::<u32>()
            .map_err(|_| {
                error::SystemError::config("DATABASE_MAX_CONNECTIONS must be a valid u32 integer")
            })?;

        let pair_ordering = lookup("PAIR_ORDERING")
            .unwrap_or_else(|| "ordered".to_string())
            .parse::<PairOrdering>()?;

        let allow_self_pairs = lookup("ALLOW_SELF_PAIRS")
            .unwrap_or_else(|| "false".to_string())
            .parse::<bool>()
            .map_err(|_| error::SystemError::config("ALLOW_SELF_PAIRS must be true or false"))?;

        Ok(Env { database_url, database_max_connections, pair_ordering, allow_self_pairs })
    }

    pub fn friend_constraints(&self) -> FriendConstraints {
        FriendConstraints {
            pair_ordering: self.pair_ordering,
            allow_self_pairs: self.allow_self_pairs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(vars: &[(&str, &str)]) -> Result<Env, error::SystemError> {
        Env::from_lookup(|key| {
            vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
        })
    }

    #[test]
    fn defaults_apply_when_unset() {
        let env = env_of(&[]).unwrap();
        assert_eq!(env.database_url, "sqlite://friendgraph.db");
        assert_eq!(env.database_max_connections, 5);
        assert_eq!(env.friend_constraints(), FriendConstraints::default());
    }

    #[test]
    fn pair_policy_comes_from_env() {
        let env = env_of(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "8"),
            ("PAIR_ORDERING", "Symmetric"),
            ("ALLOW_SELF_PAIRS", "true"),
        ])
        .unwrap();

        assert_eq!(env.database_url, "sqlite::memory:");
        assert_eq!(env.database_max_connections, 8);
        assert_eq!(
            env.friend_constraints(),
            FriendConstraints { pair_ordering: PairOrdering::Symmetric, allow_self_pairs: true }
        );
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for vars in [
            [("DATABASE_MAX_CONNECTIONS", "many")],
            [("DATABASE_MAX_CONNECTIONS", "-1")],
            [("ALLOW_SELF_PAIRS", "yes")],
            [("PAIR_ORDERING", "sideways")],
        ] {
            let err = env_of(&vars).unwrap_err();
            assert!(matches!(err, error::SystemError::Config(_)), "{vars:?}: {err:?}");
        }
    }
}
