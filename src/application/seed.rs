use crate::application::fake;
use crate::domain::ports::SyncDocumentStoreRef;
use crate::domain::sync_document::{
    ClientDocument, ClientGroupRef, Contact, GroupConfigurations, GroupDocument, Location,
    SYNC_TS_FORMAT,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{info, warn};

/// Client/group pairs published per run.
pub const DEMO_DOCUMENT_COUNT: usize = 20;

/// Fills the reads collection with synthetic client and group documents.
pub struct DemoSeeder {
    store: SyncDocumentStoreRef,
}

impl DemoSeeder {
    pub fn new(store: SyncDocumentStoreRef) -> Self {
        Self { store }
    }

    /// Publishes [`DEMO_DOCUMENT_COUNT`] clients and as many groups.
    ///
    /// Clients go to the last channel containing `clients`, groups to the
    /// last containing `groups`. Returns the number of documents stored.
    pub async fn publish(&self, channels: &[String]) -> usize {
        let client_channel = find_channel(channels, "clients");
        let group_channel = find_channel(channels, "groups");

        let now = Utc::now();
        let documents: Vec<(ClientDocument, GroupDocument)> = {
            let mut rng = rand::thread_rng();
            (0..DEMO_DOCUMENT_COUNT)
                .map(|_| demo_pair(&mut rng, &client_channel, &group_channel, now))
                .collect()
        };

        let mut published = 0;
        for (client, group) in &documents {
            match self.store.upsert_client(client).await {
                Ok(()) => {
                    info!(id = %client.id, "published client document");
                    published += 1;
                }
                Err(e) => warn!(id = %client.id, "failed to publish client document: {}", e),
            }
            match self.store.upsert_group(group).await {
                Ok(()) => {
                    info!(id = %group.id, "published group document");
                    published += 1;
                }
                Err(e) => warn!(id = %group.id, "failed to publish group document: {}", e),
            }
        }
        published
    }
}

fn find_channel(channels: &[String], kind: &str) -> String {
    channels
        .iter()
        .rev()
        .find(|channel| channel.contains(kind))
        .cloned()
        .unwrap_or_default()
}

fn demo_pair<R: Rng + ?Sized>(
    rng: &mut R,
    client_channel: &str,
    group_channel: &str,
    now: DateTime<Utc>,
) -> (ClientDocument, GroupDocument) {
    let sync_ts = now.format(SYNC_TS_FORMAT).to_string();
    let office_id = rng.gen_range(1..1000);

    let group_account = fake::account_number(rng);
    let group = GroupDocument {
        id: GroupDocument::document_id(&group_account),
        account_no: group_account,
        name: fake::sentence(rng),
        active: true,
        activation_date: vec![now.timestamp().to_string()],
        office_id,
        office_name: fake::sentence(rng),
        channels: vec![group_channel.to_string()],
        configurations: GroupConfigurations {
            min_clients_in_group: rng.gen_range(1..5),
            max_clients_in_group: rng.gen_range(5..30),
        },
        sync_ts: sync_ts.clone(),
        r#type: "groups".to_string(),
    };

    let firstname = fake::first_name(rng);
    let lastname = fake::last_name(rng);
    let client_account = fake::account_number(rng);
    let contacts = Contact {
        primary_phone_number: fake::phone_number(rng),
        email: Some(fake::email(rng, &firstname, &lastname)),
        address_line1: Some(fake::sentence(rng)),
        ..Contact::default()
    };
    let client = ClientDocument {
        id: ClientDocument::document_id(&client_account),
        account_no: client_account,
        active: true,
        activation_date: vec![now.timestamp().to_string()],
        display_name: format!("{} {}", firstname, lastname),
        firstname,
        lastname,
        office_id,
        dob: format!(
            "{}-{:02}-{:02}",
            rng.gen_range(1950..2005),
            rng.gen_range(1..=12),
            rng.gen_range(1..=28)
        ),
        gender: if rng.gen_bool(0.5) { "F" } else { "M" }.to_string(),
        national_id_number: fake::account_number(rng),
        location: Location {
            latitude: fake::latitude(rng),
            longitude: fake::longitude(rng),
        },
        contacts,
        group: ClientGroupRef {
            id: group.account_no.parse().unwrap_or_default(),
            name: group.name.clone(),
            leader: fake::full_name(rng),
        },
        channels: vec![client_channel.to_string()],
        sync_ts,
        r#type: "clients".to_string(),
    };
    (client, group)
}
