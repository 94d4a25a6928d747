use rst_common::standard::serde::de::DeserializeOwned;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;

use super::types::{decode_b64url, encode_b64url, MessageError, TYPE_SIGNATURE_ED25519};

const SIG_DATA_TIMESTAMP_LEN: usize = 8;

/// `ThreadDecorator` is the `~thread` decorator used to correlate a reply to its request
///
/// The `thid` must be equal to the `@id` of the message that started the thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(crate = "self::serde")]
pub struct ThreadDecorator {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub thid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pthid: Option<String>,
}

impl ThreadDecorator {
    pub fn new(thid: String) -> Self {
        Self {
            thid: Some(thid),
            pthid: None,
        }
    }

    pub fn get_thid(&self) -> Result<String, MessageError> {
        self.thid
            .to_owned()
            .filter(|thid| !thid.is_empty())
            .ok_or(MessageError::MissingThread)
    }
}

/// `SignatureDecorator` is a `field~sig` decorator, a signed envelope over a single
/// message field
///
/// The `sig_data` is the URL safe base64 of an 8 bytes big endian timestamp followed
/// by the JSON value of the signed field. The `signer` is the verkey that produced
/// the `signature`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct SignatureDecorator {
    #[serde(rename = "@type")]
    sig_type: String,

    signature: String,
    sig_data: String,
    signer: String,
}

impl SignatureDecorator {
    pub fn new(sig_data: &[u8], signature: &[u8], signer: String) -> Self {
        Self {
            sig_type: TYPE_SIGNATURE_ED25519.to_string(),
            signature: encode_b64url(signature),
            sig_data: encode_b64url(sig_data),
            signer,
        }
    }

    /// `build_sig_data` prepare the raw bytes that need to be signed by the signer
    pub fn build_sig_data<T: Serialize>(
        value: &T,
        timestamp: u64,
    ) -> Result<Vec<u8>, MessageError> {
        let json =
            serde_json::to_vec(value).map_err(|err| MessageError::JSONError(err.to_string()))?;

        let mut sig_data = timestamp.to_be_bytes().to_vec();
        sig_data.extend(json);
        Ok(sig_data)
    }

    pub fn get_signer(&self) -> String {
        self.signer.to_owned()
    }

    pub fn get_sig_type(&self) -> String {
        self.sig_type.to_owned()
    }

    pub fn get_sig_data(&self) -> Result<Vec<u8>, MessageError> {
        decode_b64url(&self.sig_data)
            .map_err(|err| MessageError::InvalidSignatureDecorator(err.to_string()))
    }

    pub fn get_signature(&self) -> Result<Vec<u8>, MessageError> {
        decode_b64url(&self.signature)
            .map_err(|err| MessageError::InvalidSignatureDecorator(err.to_string()))
    }

    /// `unpack` decodes the signed field, this method doesn't verify the signature,
    /// the verification belongs to the wallet
    pub fn unpack<T: DeserializeOwned>(&self) -> Result<T, MessageError> {
        let sig_data = self.get_sig_data()?;
        if sig_data.len() <= SIG_DATA_TIMESTAMP_LEN {
            return Err(MessageError::InvalidSignatureDecorator(
                "sig_data is too short".to_string(),
            ));
        }

        serde_json::from_slice(&sig_data[SIG_DATA_TIMESTAMP_LEN..])
            .map_err(|err| MessageError::InvalidSignatureDecorator(err.to_string()))
    }
}
