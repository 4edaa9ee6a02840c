//! Publishing lab credentials as one-shot pastes.
//!
//! Each provisioned lab has two secrets: the cluster admin password and the
//! kubeconfig. Both are published as separate pastes and the share URLs are
//! collected per lab, password first.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::paste::{PasteClient, PasteError, PasteOptions};
use crate::secrets::{SecretError, SecretSource};

/// Key holding the admin password inside its secret.
pub const ADMIN_PASSWORD_KEY: &str = "password";

/// Key holding the kubeconfig inside its secret.
pub const KUBECONFIG_KEY: &str = "kubeconfig";

/// Names of the secrets provisioned for one lab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabSecretRefs {
    pub lab_id: String,
    pub admin_password_secret: String,
    pub kubeconfig_secret: String,
}

/// Credential publication errors
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("lab {lab_id}: cannot read secret: {source}")]
    Secret {
        lab_id: String,
        #[source]
        source: SecretError,
    },

    #[error("lab {lab_id}: cannot create paste: {source}")]
    Paste {
        lab_id: String,
        #[source]
        source: PasteError,
    },
}

/// Share URLs per lab id.
pub type LabPastes = BTreeMap<String, Vec<String>>;

/// Publish the admin password and kubeconfig of every lab.
///
/// Labs are processed concurrently; the first failure in `labs` order is
/// returned. A lab id listed more than once accumulates URLs.
pub async fn publish_lab_credentials<S>(
    client: &PasteClient,
    source: &S,
    namespace: &str,
    labs: &[LabSecretRefs],
    options: &PasteOptions,
    deadline: Duration,
) -> Result<LabPastes, PublishError>
where
    S: SecretSource + ?Sized,
{
    let results = join_all(
        labs.iter()
            .map(|lab| publish_lab(client, source, namespace, lab, options, deadline)),
    )
    .await;

    let mut pastes = LabPastes::new();
    for (lab, result) in labs.iter().zip(results) {
        pastes.entry(lab.lab_id.clone()).or_default().extend(result?);
    }

    Ok(pastes)
}

async fn publish_lab<S>(
    client: &PasteClient,
    source: &S,
    namespace: &str,
    lab: &LabSecretRefs,
    options: &PasteOptions,
    deadline: Duration,
) -> Result<Vec<String>, PublishError>
where
    S: SecretSource + ?Sized,
{
    let secret_error = |err| PublishError::Secret {
        lab_id: lab.lab_id.clone(),
        source: err,
    };

    let password = source
        .read(namespace, &lab.admin_password_secret, ADMIN_PASSWORD_KEY)
        .await
        .map_err(secret_error)?;
    let kubeconfig = source
        .read(namespace, &lab.kubeconfig_secret, KUBECONFIG_KEY)
        .await
        .map_err(secret_error)?;
    debug!(lab_id = %lab.lab_id, "Read lab secrets");

    let mut urls = Vec::with_capacity(2);
    for payload in [&password, &kubeconfig] {
        let response = client
            .create_paste(payload.as_str(), options, deadline)
            .await
            .map_err(|err| PublishError::Paste {
                lab_id: lab.lab_id.clone(),
                source: err,
            })?;
        urls.push(response.url);
    }

    info!(lab_id = %lab.lab_id, pastes = urls.len(), "Published lab credentials");
    Ok(urls)
}
