//! Signing and verification of open oracle bundles.

use alloy::primitives::{Address, Bytes};
use alloy::signers::Signature;
use alloy::sol_types::SolValue;

use crate::error::{RelayError, RelayResult};
use crate::openoracle::signer::OracleSigner;
use crate::openoracle::types::{
    OracleRequest, PriceEntry, PriceMessage, PriceObservation, SignedOracleBundle, MESSAGE_KIND,
};

impl OracleRequest {
    pub fn new(timestamp: u64, prices: Vec<PriceObservation>) -> Self {
        Self { timestamp, prices }
    }

    /// ABI-encode the request into the canonical signed message.
    pub fn encode_message(&self) -> Vec<u8> {
        PriceMessage {
            kind: MESSAGE_KIND.to_string(),
            timestamp: self.timestamp,
            prices: self.prices.iter().map(PriceEntry::from).collect(),
        }
        .abi_encode()
    }

    /// Sign the bundle, producing the open oracle document.
    pub async fn sign(&self, signer: &OracleSigner) -> RelayResult<SignedOracleBundle> {
        if self.prices.is_empty() {
            return Err(RelayError::InvalidInput(
                "Cannot bundle an empty set of observations".to_string(),
            ));
        }

        let message = self.encode_message();
        let signature = signer.sign_message(&message).await?;

        Ok(SignedOracleBundle {
            timestamp: self.timestamp,
            prices: self.prices.clone(),
            message: Bytes::from(message),
            signature: Bytes::copy_from_slice(&signature.as_bytes()),
            signer: signer.address(),
        })
    }
}

/// Recover the signer and the observations from a signed bundle.
///
/// Only the embedded message is trusted; the plain `prices` and `signer`
/// fields are left for the caller to cross-check.
pub fn verify(bundle: &SignedOracleBundle) -> RelayResult<(Address, Vec<PriceObservation>)> {
    let decoded = <PriceMessage as SolValue>::abi_decode(&bundle.message)
        .map_err(|e| RelayError::Encoding(format!("Invalid open oracle message: {}", e)))?;

    if decoded.kind != MESSAGE_KIND {
        return Err(RelayError::Encoding(format!(
            "Unexpected message kind '{}'",
            decoded.kind
        )));
    }

    let signature = Signature::from_raw(&bundle.signature)
        .map_err(|e| RelayError::Crypto(format!("Malformed signature: {}", e)))?;

    let address = signature
        .recover_address_from_msg(&bundle.message[..])
        .map_err(|e| RelayError::Crypto(format!("Signature recovery failed: {}", e)))?;

    let prices = decoded.prices.into_iter().map(PriceObservation::from).collect();

    Ok((address, prices))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const OTHER_PRIVATE_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    fn btc_observations() -> Vec<PriceObservation> {
        vec![PriceObservation::new("BTC", 1_700_000_000, "42000.50")]
    }

    #[tokio::test]
    async fn test_sign_and_verify_btc() {
        let signer = OracleSigner::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let request = OracleRequest::new(1_700_000_000, btc_observations());

        let bundle = request.sign(&signer).await.unwrap();
        assert_eq!(bundle.signature.len(), 65);
        assert_eq!(bundle.signer, signer.address());

        let (address, prices) = verify(&bundle).unwrap();
        assert_eq!(address, signer.address());
        assert_eq!(
            address.to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(prices, btc_observations());
    }

    #[tokio::test]
    async fn test_round_trip_preserves_order() {
        let signer = OracleSigner::from_private_key(OTHER_PRIVATE_KEY).unwrap();
        let prices = vec![
            PriceObservation::new("ETH", 1_700_000_100, "2250.125"),
            PriceObservation::new("BTC", 1_700_000_090, "42000.50"),
            PriceObservation::new("DAI", 1_700_000_095, "1"),
        ];
        let bundle = OracleRequest::new(1_700_000_100, prices.clone())
            .sign(&signer)
            .await
            .unwrap();

        let (address, recovered) = verify(&bundle).unwrap();
        assert_eq!(address, signer.address());
        assert_eq!(recovered, prices);
    }

    #[tokio::test]
    async fn test_empty_bundle_rejected() {
        let signer = OracleSigner::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let result = OracleRequest::new(1, Vec::new()).sign(&signer).await;
        assert!(matches!(result, Err(RelayError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_tampered_message_recovers_other_address() {
        let signer = OracleSigner::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let mut bundle = OracleRequest::new(1_700_000_000, btc_observations())
            .sign(&signer)
            .await
            .unwrap();

        let forged = OracleRequest::new(
            1_700_000_000,
            vec![PriceObservation::new("BTC", 1_700_000_000, "1.00")],
        );
        bundle.message = Bytes::from(forged.encode_message());

        let (address, prices) = verify(&bundle).unwrap();
        assert_ne!(address, signer.address());
        assert_eq!(prices[0].price, "1.00");
    }

    #[tokio::test]
    async fn test_malformed_signature() {
        let signer = OracleSigner::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let mut bundle = OracleRequest::new(1_700_000_000, btc_observations())
            .sign(&signer)
            .await
            .unwrap();
        bundle.signature = Bytes::from_static(&[1, 2, 3]);

        assert!(matches!(verify(&bundle), Err(RelayError::Crypto(_))));
    }

    #[test]
    fn test_garbage_message() {
        let bundle = SignedOracleBundle {
            timestamp: 0,
            prices: Vec::new(),
            message: Bytes::from_static(b"not abi"),
            signature: Bytes::from(vec![0u8; 65]),
            signer: Address::ZERO,
        };
        assert!(matches!(verify(&bundle), Err(RelayError::Encoding(_))));
    }

    #[tokio::test]
    async fn test_json_round_trip_still_verifies() {
        let signer = OracleSigner::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let bundle = OracleRequest::new(1_700_000_000, btc_observations())
            .sign(&signer)
            .await
            .unwrap();

        let wire = bundle.to_json_bytes().unwrap();
        let parsed = SignedOracleBundle::from_json_bytes(&wire).unwrap();
        assert_eq!(parsed, bundle);
        assert_eq!(verify(&parsed).unwrap().0, signer.address());
    }
}
