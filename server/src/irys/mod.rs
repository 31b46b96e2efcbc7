//! Client side of the Irys bundler protocol.
//!
//! Uploads are wrapped in ANS-104 data items signed by a Solana (ed25519)
//! wallet and posted to a bundler node, which answers with the item id.
//!
//! - `wallet` parses the secret key credential
//! - `tags` serializes tags with Avro
//! - `deep_hash` is the Arweave SHA-384 deep hash the signature covers
//! - `data_item` assembles and signs the binary item
//! - `client` talks to the node and implements `Uploader`

pub mod client;
pub mod data_item;
pub mod deep_hash;
pub mod tags;
pub mod wallet;

pub use client::{BundlerClient, BundlerFactory, CredentialSource};
pub use data_item::DataItem;
pub use wallet::SolanaWallet;
