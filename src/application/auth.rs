use crate::application::fake;
use crate::domain::ports::UserRegistryRef;
use crate::domain::user::{Claims, OrgUnit, ProvisionedUser, SyncGatewayUser};
use crate::error::{GatewayError, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;
use uuid::Uuid;

/// Tokens shorter than this are rejected outright.
pub const MIN_TOKEN_LEN: usize = 100;

const ROLES: &[&str] = &["replicator", "oaf_dev", "oaf_fo"];
const COUNTRIES: &[&str] = &["Kenya", "Rwanda"];
const LEVELS: &[&str] = &["Region", "District", "Site", "Group"];

/// Turns a device login into sync gateway users.
///
/// Token signatures are not verified: any token long enough yields freshly
/// fabricated claims and organisation units.
pub struct LoginService {
    registry: UserRegistryRef,
    databases: Vec<String>,
}

impl LoginService {
    /// # Arguments
    ///
    /// * `registry` - The sync gateway admin API.
    /// * `databases` - Databases the user is created in, in order.
    pub fn new(registry: UserRegistryRef, databases: Vec<String>) -> Self {
        Self {
            registry,
            databases,
        }
    }

    pub fn retrieve_claims(&self, jwt: &str) -> Result<Claims> {
        if jwt.len() < MIN_TOKEN_LEN {
            return Err(GatewayError::Unauthorized("invalid token".to_string()));
        }

        let mut rng = rand::thread_rng();
        let given_name = fake::first_name(&mut rng);
        let family_name = fake::last_name(&mut rng);
        let email = fake::email(&mut rng, &given_name, &family_name);
        Ok(Claims {
            given_name,
            family_name,
            email,
            roles: ROLES.iter().map(|role| role.to_string()).collect(),
        })
    }

    pub async fn login(&self, jwt: &str) -> Result<ProvisionedUser> {
        let claims = self.retrieve_claims(jwt)?;
        let org_units = generate_org_units(&mut rand::thread_rng());
        let (user, provisioned) = build_user(&claims, org_units);

        for database in &self.databases {
            self.registry.create_user(database, &user).await?;
        }
        info!(user = %user.name, "sync gateway user created");
        Ok(provisioned)
    }
}

/// One to five units; the first is a country and each later unit is a child
/// of the one before it.
pub fn generate_org_units<R: Rng + ?Sized>(rng: &mut R) -> Vec<OrgUnit> {
    let count = rng.gen_range(1..=5);
    let mut units: Vec<OrgUnit> = Vec::with_capacity(count);

    for index in 0..count {
        let id = rng.gen_range(100..=999);
        let unit = match units.last() {
            None => OrgUnit {
                id,
                name: COUNTRIES.choose(rng).copied().unwrap_or("Kenya").to_string(),
                parent: 0,
                level_name: "Country".to_string(),
                is_country: true,
            },
            Some(previous) => OrgUnit {
                id,
                name: fake::sentence(rng),
                parent: previous.id,
                level_name: LEVELS[(index - 1) % LEVELS.len()].to_string(),
                is_country: false,
            },
        };
        units.push(unit);
    }
    units
}

/// Builds the gateway user and the credentials returned to the device.
pub fn build_user(claims: &Claims, org_units: Vec<OrgUnit>) -> (SyncGatewayUser, ProvisionedUser) {
    let name = claims.email.replace('@', "_");
    let password = Uuid::new_v4().to_string();

    let mut roles: Vec<String> = claims.roles.iter().map(|r| r.replace(' ', "_")).collect();
    roles.push("replicator".to_string());

    let unit_ids: Vec<String> = org_units.iter().map(|unit| unit.id.to_string()).collect();
    let channel = format!("clients_{}", unit_ids.join("_"));
    let admin_channels = vec![channel.clone(), name.clone()];

    let user = SyncGatewayUser {
        name: name.clone(),
        password: password.clone(),
        admin_channels: admin_channels.clone(),
        all_channels: vec![channel, name.clone(), "!".to_string()],
        disabled: false,
        admin_roles: roles.clone(),
        roles: roles.clone(),
    };
    let provisioned = ProvisionedUser {
        name,
        password,
        admin_roles: roles,
        admin_channels,
        geographic_info: org_units,
    };
    (user, provisioned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::UserRegistry;
    use async_trait::async_trait;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingRegistry {
        calls: Mutex<Vec<(String, SyncGatewayUser)>>,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl UserRegistry for RecordingRegistry {
        async fn create_user(&self, database: &str, user: &SyncGatewayUser) -> Result<()> {
            if self.fail_on == Some(database) {
                return Err(GatewayError::remote(Some(409), "conflict"));
            }
            self.calls
                .lock()
                .unwrap()
                .push((database.to_string(), user.clone()));
            Ok(())
        }
    }

    fn service(registry: Arc<RecordingRegistry>) -> LoginService {
        LoginService::new(
            registry,
            vec!["offline_reads".to_string(), "offline_writes".to_string()],
        )
    }

    #[test]
    fn test_short_token_rejected() {
        let service = service(Arc::new(RecordingRegistry::default()));
        let err = service.retrieve_claims(&"x".repeat(99)).unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized(_)));

        let claims = service.retrieve_claims(&"x".repeat(100)).unwrap();
        assert_eq!(claims.roles, vec!["replicator", "oaf_dev", "oaf_fo"]);
        assert!(claims.email.contains('@'));
    }

    #[test]
    fn test_org_units_chain_from_country() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let units = generate_org_units(&mut rng);
            assert!((1..=5).contains(&units.len()));
            assert!(units[0].is_country);
            assert!(units[0].name == "Kenya" || units[0].name == "Rwanda");
            assert_eq!(units[0].parent, 0);
            for pair in units.windows(2) {
                assert_eq!(pair[1].parent, pair[0].id);
                assert!(!pair[1].is_country);
            }
            assert!(units.iter().all(|unit| (100..=999).contains(&unit.id)));
        }
    }

    #[test]
    fn test_build_user_channels_and_roles() {
        let claims = Claims {
            given_name: "Jane".to_string(),
            family_name: "Doe".to_string(),
            email: "jane@example.org".to_string(),
            roles: vec!["field officer".to_string()],
        };
        let units = vec![
            OrgUnit {
                id: 101,
                name: "Kenya".to_string(),
                parent: 0,
                level_name: "Country".to_string(),
                is_country: true,
            },
            OrgUnit {
                id: 202,
                name: "Hill road".to_string(),
                parent: 101,
                level_name: "Region".to_string(),
                is_country: false,
            },
        ];

        let (user, provisioned) = build_user(&claims, units);

        assert_eq!(user.name, "jane_example.org");
        assert_eq!(user.roles, vec!["field_officer", "replicator"]);
        assert_eq!(user.admin_channels, vec!["clients_101_202", "jane_example.org"]);
        assert_eq!(user.all_channels, vec!["clients_101_202", "jane_example.org", "!"]);
        assert!(Uuid::parse_str(&user.password).is_ok());
        assert_eq!(provisioned.password, user.password);
        assert_eq!(provisioned.geographic_info.len(), 2);
    }

    #[tokio::test]
    async fn test_login_creates_user_in_each_database() {
        let registry = Arc::new(RecordingRegistry::default());
        let provisioned = service(registry.clone()).login(&"t".repeat(120)).await.unwrap();

        let calls = registry.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "offline_reads");
        assert_eq!(calls[1].0, "offline_writes");
        assert_eq!(calls[0].1.name, provisioned.name);
    }

    #[tokio::test]
    async fn test_login_stops_on_registry_failure() {
        let registry = Arc::new(RecordingRegistry {
            fail_on: Some("offline_writes"),
            ..RecordingRegistry::default()
        });
        let err = service(registry.clone()).login(&"t".repeat(120)).await.unwrap_err();

        assert!(matches!(err, GatewayError::RemoteCallFailed { status: Some(409), .. }));
        assert_eq!(registry.calls.lock().unwrap().len(), 1);
    }
}
