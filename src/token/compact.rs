// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::base64;
use super::errors::Error;

/// The raw material of a JWS in compact serialization, as found on the wire
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompactToken {
    /// Decoded JOSE header (UTF-8 JSON, not yet parsed)
    pub header_bytes: Vec<u8>,
    /// Decoded payload (UTF-8 JSON, not yet parsed)
    pub payload_bytes: Vec<u8>,
    /// Decoded signature
    pub signature_bytes: Vec<u8>,
    /// The exact bytes covered by the signature: the first two segments and
    /// the dot between them, exactly as they appeared in the input
    pub signed_content: Vec<u8>,
}

impl CompactToken {
    /// Split `token` on its two dots and decode the three segments
    pub fn parse(token: &str) -> Result<CompactToken, Error> {
        let first = token
            .find('.')
            .ok_or_else(|| Error::MalformedToken("no segment separator found".to_string()))?;

        let second = token[first + 1..]
            .find('.')
            .map(|i| first + 1 + i)
            .ok_or_else(|| Error::MalformedToken("expecting 3 segments, got 2".to_string()))?;

        if token[second + 1..].contains('.') {
            return Err(Error::MalformedToken(
                "expecting 3 segments, got more".to_string(),
            ));
        }

        let header_bytes = base64::decode_segment(&token[..first])
            .map_err(|e| Error::MalformedToken(format!("header segment: {e:?}")))?;
        let payload_bytes = base64::decode_segment(&token[first + 1..second])
            .map_err(|e| Error::MalformedToken(format!("payload segment: {e:?}")))?;
        let signature_bytes = base64::decode_segment(&token[second + 1..])
            .map_err(|e| Error::MalformedToken(format!("signature segment: {e:?}")))?;

        Ok(CompactToken {
            header_bytes,
            payload_bytes,
            signature_bytes,
            signed_content: token.as_bytes()[..second].to_vec(),
        })
    }

    /// The JWS signing input for the given header and payload
    pub fn signing_input(header: &[u8], payload: &[u8]) -> String {
        format!(
            "{}.{}",
            base64::encode_segment(header),
            base64::encode_segment(payload)
        )
    }

    /// Serialize header, payload and signature in compact form
    pub fn encode(header: &[u8], payload: &[u8], signature: &[u8]) -> String {
        format!(
            "{}.{}",
            Self::signing_input(header, payload),
            base64::encode_segment(signature)
        )
    }
}
