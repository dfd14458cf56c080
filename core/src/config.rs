//! Service configuration.
//!
//! Built once at startup, validated, and passed by value to the service.
//! Nothing in the crypto core reads the environment.

use crate::{
    error::{Error, Result},
    keepers::{OaepDigest, MAX_RSA_BITS, MIN_RSA_BITS},
    util::getenv_default,
};
use serde::Deserialize;
use std::str::FromStr;

/// Environment variable holding the modulus size for generated key pairs
pub const ENV_RSA_BITS: &str = "RECORD_KEEPER_RSA_BITS";
/// Environment variable holding the OAEP digest name (`sha1` or `sha256`)
pub const ENV_OAEP_DIGEST: &str = "RECORD_KEEPER_OAEP_DIGEST";

/// Names of the attachments handed to principals
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AttachmentNames {
    /// private half of a newly generated key pair
    pub private_key: String,
    /// owner's self-wrapped epoch key
    pub owner_artifact: String,
    /// prefix of an operator's wrapped epoch key; the operator id and `.txt` follow
    pub operator_artifact_prefix: String,
    /// recovered document key, base64
    pub document_key: String,
}

impl Default for AttachmentNames {
    fn default() -> Self {
        Self {
            private_key: "private-key.pem".to_string(),
            owner_artifact: "epoch-key.txt".to_string(),
            operator_artifact_prefix: "epoch-key-".to_string(),
            document_key: "document-key.txt".to_string(),
        }
    }
}

impl AttachmentNames {
    pub fn operator_artifact(&self, operator_id: &str) -> String {
        format!("{}{}.txt", self.operator_artifact_prefix, operator_id)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeeperConfig {
    /// Modulus size of generated RSA key pairs
    pub rsa_bits: usize,
    /// Digest for RSA-OAEP wrapping
    pub oaep_digest: OaepDigest,
    pub attachments: AttachmentNames,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            rsa_bits: MIN_RSA_BITS,
            oaep_digest: OaepDigest::default(),
            attachments: AttachmentNames::default(),
        }
    }
}

impl KeeperConfig {
    /// Read settings from the environment, falling back to defaults, and validate.
    pub fn from_env() -> Result<Self, Error> {
        let defaults = Self::default();
        let bits = getenv_default(ENV_RSA_BITS, &defaults.rsa_bits.to_string());
        let digest = getenv_default(ENV_OAEP_DIGEST, &defaults.oaep_digest.to_string());
        let config = Self {
            rsa_bits: bits.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!("{} is not a number: {:?}", ENV_RSA_BITS, bits))
            })?,
            oaep_digest: OaepDigest::from_str(digest.trim()).map_err(|_| {
                Error::InvalidConfig(format!(
                    "{} must be sha1 or sha256, got {:?}",
                    ENV_OAEP_DIGEST, digest
                ))
            })?,
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.rsa_bits < MIN_RSA_BITS || self.rsa_bits > MAX_RSA_BITS || self.rsa_bits % 256 != 0
        {
            return Err(Error::InvalidConfig(format!(
                "rsa_bits must be a multiple of 256 between {} and {}, got {}",
                MIN_RSA_BITS, MAX_RSA_BITS, self.rsa_bits
            )));
        }
        let names = &self.attachments;
        for (field, value) in [
            ("private_key", &names.private_key),
            ("owner_artifact", &names.owner_artifact),
            ("operator_artifact_prefix", &names.operator_artifact_prefix),
            ("document_key", &names.document_key),
        ] {
            if value.is_empty() || value.contains('/') || value.contains('\\') {
                return Err(Error::InvalidConfig(format!(
                    "attachment name {} must be a plain file name",
                    field
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{KeeperConfig, ENV_OAEP_DIGEST, ENV_RSA_BITS};
    use crate::{error::Error, keepers::OaepDigest};

    #[test]
    fn defaults_are_valid() {
        let config = KeeperConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rsa_bits, 2048);
        assert_eq!(config.oaep_digest, OaepDigest::Sha1);
        assert_eq!(
            config.attachments.operator_artifact("S-042"),
            "epoch-key-S-042.txt"
        );
    }

    #[test]
    fn bad_values_rejected() {
        for bits in [1024usize, 2049, 4352, 8192] {
            let config = KeeperConfig {
                rsa_bits: bits,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        }
        let mut config = KeeperConfig::default();
        config.attachments.document_key = "../key.txt".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn deserialize_partial() -> Result<(), serde_json::Error> {
        let config: KeeperConfig = serde_json::from_str(
            r#"{ "rsa_bits": 3072, "oaep_digest": "sha256",
                 "attachments": { "document_key": "clave.txt" } }"#,
        )?;
        assert_eq!(config.rsa_bits, 3072);
        assert_eq!(config.oaep_digest, OaepDigest::Sha256);
        assert_eq!(config.attachments.document_key, "clave.txt");
        assert_eq!(config.attachments.owner_artifact, "epoch-key.txt");
        assert!(config.validate().is_ok());

        let empty: KeeperConfig = serde_json::from_str("{}")?;
        assert_eq!(empty, KeeperConfig::default());

        let oversized: KeeperConfig = serde_json::from_str(r#"{ "rsa_bits": 8192 }"#)?;
        assert!(matches!(oversized.validate(), Err(Error::InvalidConfig(_))));
        Ok(())
    }

    // only this test sets these variables
    #[test]
    fn from_environment() {
        std::env::remove_var(ENV_RSA_BITS);
        std::env::remove_var(ENV_OAEP_DIGEST);
        assert_eq!(
            KeeperConfig::from_env().expect("defaults"),
            KeeperConfig::default()
        );

        std::env::set_var(ENV_RSA_BITS, "3072");
        std::env::set_var(ENV_OAEP_DIGEST, "SHA256");
        let config = KeeperConfig::from_env().expect("custom");
        assert_eq!(config.rsa_bits, 3072);
        assert_eq!(config.oaep_digest, OaepDigest::Sha256);

        std::env::set_var(ENV_RSA_BITS, "lots");
        assert!(matches!(
            KeeperConfig::from_env(),
            Err(Error::InvalidConfig(_))
        ));

        std::env::set_var(ENV_RSA_BITS, "2048");
        std::env::set_var(ENV_OAEP_DIGEST, "md5");
        assert!(matches!(
            KeeperConfig::from_env(),
            Err(Error::InvalidConfig(_))
        ));

        std::env::remove_var(ENV_RSA_BITS);
        std::env::remove_var(ENV_OAEP_DIGEST);
    }
}
