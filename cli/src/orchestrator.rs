//! Verification orchestration and the storage client
//!
//! One verification call is one atomic transaction:
//!
//! ```text
//! [0] compute-budget request (the precompile cost exceeds defaults)
//! [1] native precompile verification instruction
//! [2] chainauth program call (introspects [1], returns the verdict)
//! ```
//!
//! If any instruction fails the whole batch rolls back, so there is no
//! partial-effect state to reconcile. After confirmation the program's
//! boolean verdict is read from the transaction's return-data channel.
//! Nothing is retried: verification is a pure function of its inputs, so
//! resubmitting unchanged inputs cannot change the outcome.

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use borsh::BorshDeserialize;
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::instruction::{AccountMeta, Instruction, InstructionError};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use solana_sdk::system_program;
use solana_sdk::sysvar::instructions::ID as INSTRUCTIONS_SYSVAR_ID;
use solana_sdk::transaction::{Transaction, TransactionError};
use solana_transaction_status::{UiTransactionEncoding, UiTransactionReturnData};
use thiserror::Error;

use crate::chunker::{reassemble, ChunkedPayload};
use crate::config::VerifierConfig;
use crate::derive::eth_address_from_compressed;
use crate::message::{eth_signed_message, webauthn_message};
use crate::precompile::{build_verification_instruction, SignatureScheme};
use crate::signature::{normalize, parse_signature, CodecError, Curve, VEncoding};

/// Transaction index the verification instruction occupies; the k1
/// offsets table embeds it.
const VERIFICATION_INSTRUCTION_INDEX: u8 = 1;

/// Keccak-secp256k1 precompile custom error for a cryptographically
/// invalid signature ("custom program error: 0x2")
const PRECOMPILE_INVALID_SIGNATURE: u32 = 2;

// Anchor custom error codes (6000 + variant index in ChainAuthError)
const ERROR_MISSING_SECP256K1_INSTRUCTION: u32 = 6005;
const ERROR_MISSING_SECP256R1_INSTRUCTION: u32 = 6006;

// Instruction discriminators, sha256("global:<name>")[..8]
const VERIFY_ETHEREUM_SIGNATURE_DISCRIMINATOR: [u8; 8] =
    [0xfa, 0x91, 0x89, 0x59, 0xdd, 0xde, 0x29, 0xe9];
const VERIFY_WEBAUTHN_SIGNATURE_DISCRIMINATOR: [u8; 8] =
    [0x3e, 0xa0, 0x12, 0xf8, 0x43, 0xe1, 0x34, 0xfe];
const INIT_STORAGE_DISCRIMINATOR: [u8; 8] = [0xe7, 0x50, 0xc4, 0x2d, 0x4f, 0xf8, 0x9c, 0x20];
const STORE_CHUNK_DISCRIMINATOR: [u8; 8] = [0x64, 0x93, 0x4e, 0x9d, 0x52, 0xc5, 0xfd, 0xa5];
const RETRIEVE_CHUNK_DISCRIMINATOR: [u8; 8] = [0xa2, 0x56, 0x47, 0x30, 0x54, 0xcd, 0x53, 0xe9];
const GET_DATA_METADATA_DISCRIMINATOR: [u8; 8] = [0xe2, 0xfa, 0x5d, 0x36, 0x2a, 0xc3, 0x95, 0x6b];
const CLOSE_STORAGE_DISCRIMINATOR: [u8; 8] = [0x5b, 0x54, 0x18, 0x8d, 0xbc, 0x67, 0xa7, 0xae];

/// Outcome of a verification attempt. A cryptographically invalid
/// signature is an expected, non-exceptional value - never an `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Accepted,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// the precompile itself refused the signature
    InvalidSignature,
    /// the precompile instruction did not commit to this request's
    /// address/key, signature and message
    PayloadMismatch,
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Derive(#[from] crate::derive::DeriveError),

    #[error(transparent)]
    Build(#[from] crate::precompile::BuildError),

    #[error("invalid request: {0}")]
    BadRequest(String),

    /// Caller wiring bug, distinct from a cryptographic rejection: the
    /// transaction omitted the required precompile instruction.
    #[error("transaction omitted the required verification instruction")]
    MissingVerificationInstruction,

    /// Opaque platform rejection, diagnostic carried verbatim.
    #[error("platform rejected the transaction: {0}")]
    Platform(String),
}

#[derive(Debug, Clone)]
pub struct EthereumVerifyRequest {
    /// 0x + 130 hex chars (65 bytes)
    pub signature: String,
    /// raw payload the wallet displayed; prefixing happens on both sides
    pub message: String,
    /// 0x + 40 hex chars (address) or 0x + 66 hex chars (compressed key)
    pub public_key_or_address: String,
    pub v_encoding: VEncoding,
}

#[derive(Debug, Clone)]
pub struct WebauthnVerifyRequest {
    /// 0x + 128 hex chars (64 bytes)
    pub signature: String,
    pub authenticator_data: String,
    /// raw clientDataJSON, used byte for byte
    pub client_data: String,
    /// 0x + 66 hex chars
    pub compressed_public_key: String,
}

#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Set false only to exercise the missing-instruction negative path.
    pub include_verification_instruction: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            include_verification_instruction: true,
        }
    }
}

/// Dataset metadata as returned by the program (borsh layout must match
/// the on-chain `DataMetadata`)
#[derive(Debug, Clone, borsh::BorshDeserialize)]
pub struct DatasetMetadata {
    pub dataset_id: [u8; 32],
    pub total_chunks: u32,
    pub chunks_stored: u32,
    pub dataset_hash: [u8; 32],
}

impl DatasetMetadata {
    pub fn is_complete(&self) -> bool {
        self.chunks_stored == self.total_chunks
    }
}

pub struct VerificationClient {
    rpc: RpcClient,
    config: VerifierConfig,
    payer: Keypair,
}

impl VerificationClient {
    pub fn new(rpc_url: &str, config: VerifierConfig, payer: Keypair) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(
                rpc_url.to_string(),
                CommitmentConfig::confirmed(),
            ),
            config,
            payer,
        }
    }

    pub fn payer_pubkey(&self) -> Pubkey {
        self.payer.pubkey()
    }

    // ========================================================================
    // Signature verification
    // ========================================================================

    pub fn verify_ethereum(
        &self,
        request: &EthereumVerifyRequest,
        options: &VerifyOptions,
    ) -> Result<VerifyOutcome, VerifyError> {
        let parsed = parse_signature(&request.signature, Curve::Secp256k1, request.v_encoding)?;

        let key_or_address = decode_hex(&request.public_key_or_address)?;
        let eth_address = match key_or_address.len() {
            20 => {
                let mut address = [0u8; 20];
                address.copy_from_slice(&key_or_address);
                address
            }
            33 => eth_address_from_compressed(&key_or_address)?,
            n => {
                return Err(VerifyError::BadRequest(format!(
                    "expected a 20-byte address or 33-byte compressed key, got {n} bytes"
                )))
            }
        };

        let message = eth_signed_message(request.message.as_bytes());
        let verification_ix = build_verification_instruction(
            &self.config.secp256k1_program_id,
            SignatureScheme::K1Address,
            &parsed,
            &eth_address,
            &message,
            VERIFICATION_INSTRUCTION_INDEX,
        )?;

        // program args: EthereumValidationData { signature, message },
        // eth_address: String
        let mut data = Vec::new();
        data.extend_from_slice(&VERIFY_ETHEREUM_SIGNATURE_DISCRIMINATOR);
        append_string(&mut data, &request.signature);
        append_string(&mut data, &request.message);
        append_string(&mut data, &format!("0x{}", hex::encode(eth_address)));

        let program_ix = Instruction {
            program_id: self.config.program_id,
            accounts: vec![AccountMeta::new_readonly(INSTRUCTIONS_SYSVAR_ID, false)],
            data,
        };

        self.execute_verification(verification_ix, program_ix, options)
    }

    pub fn verify_webauthn(
        &self,
        request: &WebauthnVerifyRequest,
        options: &VerifyOptions,
    ) -> Result<VerifyOutcome, VerifyError> {
        // 64 bytes, no recovery byte; normalized to low-s BEFORE the
        // instruction is built
        let parsed = parse_signature(
            &request.signature,
            Curve::Secp256r1,
            VEncoding::RawRecovery,
        )?;
        let canonical = normalize(&parsed, Curve::Secp256r1)?;

        let compressed_pubkey = decode_hex(&request.compressed_public_key)?;
        let authenticator_data = decode_hex(&request.authenticator_data)?;
        let message = webauthn_message(&authenticator_data, &request.client_data);

        let verification_ix = build_verification_instruction(
            &self.config.secp256r1_program_id,
            SignatureScheme::R1Pubkey,
            &canonical,
            &compressed_pubkey,
            &message,
            VERIFICATION_INSTRUCTION_INDEX,
        )?;

        // program args: WebauthnValidationData { signature,
        // authenticator_data, client_data }, compressed_public_key: String
        let mut data = Vec::new();
        data.extend_from_slice(&VERIFY_WEBAUTHN_SIGNATURE_DISCRIMINATOR);
        append_string(&mut data, &request.signature);
        append_string(&mut data, &request.authenticator_data);
        append_string(&mut data, &request.client_data);
        append_string(&mut data, &request.compressed_public_key);

        let program_ix = Instruction {
            program_id: self.config.program_id,
            accounts: vec![AccountMeta::new_readonly(INSTRUCTIONS_SYSVAR_ID, false)],
            data,
        };

        self.execute_verification(verification_ix, program_ix, options)
    }

    /// Built -> Submitted -> Confirmed -> {Accepted | Rejected}. A
    /// rejected submission is terminal; the caller may resubmit with
    /// corrected inputs but this client never retries.
    fn execute_verification(
        &self,
        verification_ix: Instruction,
        program_ix: Instruction,
        options: &VerifyOptions,
    ) -> Result<VerifyOutcome, VerifyError> {
        let mut instructions = vec![ComputeBudgetInstruction::set_compute_unit_limit(
            self.config.compute_unit_limit,
        )];
        if options.include_verification_instruction {
            instructions.push(verification_ix);
        }
        instructions.push(program_ix);

        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .map_err(|err| VerifyError::Platform(err.to_string()))?;
        let transaction = Transaction::new_signed_with_payer(
            &instructions,
            Some(&self.payer.pubkey()),
            &[&self.payer],
            blockhash,
        );

        match self.rpc.send_and_confirm_transaction(&transaction) {
            Ok(signature) => self.read_verdict(&signature),
            Err(err) => {
                match err.get_transaction_error() {
                    Some(TransactionError::InstructionError(
                        index,
                        InstructionError::Custom(code),
                    )) => {
                        if index == VERIFICATION_INSTRUCTION_INDEX
                            && code == PRECOMPILE_INVALID_SIGNATURE
                        {
                            return Ok(VerifyOutcome::Rejected(RejectReason::InvalidSignature));
                        }
                        if code == ERROR_MISSING_SECP256K1_INSTRUCTION
                            || code == ERROR_MISSING_SECP256R1_INSTRUCTION
                        {
                            return Err(VerifyError::MissingVerificationInstruction);
                        }
                        Err(VerifyError::Platform(err.to_string()))
                    }
                    _ => Err(VerifyError::Platform(err.to_string())),
                }
            }
        }
    }

    /// Reads the program's declared boolean from the confirmed
    /// transaction's return-data channel. Absent return data counts as a
    /// rejection, matching the platform's "1 = valid, 0/absent = invalid"
    /// encoding.
    fn read_verdict(&self, signature: &Signature) -> Result<VerifyOutcome, VerifyError> {
        let transaction = self
            .rpc
            .get_transaction_with_config(
                signature,
                RpcTransactionConfig {
                    encoding: Some(UiTransactionEncoding::Json),
                    commitment: Some(CommitmentConfig::confirmed()),
                    max_supported_transaction_version: Some(0),
                },
            )
            .map_err(|err| VerifyError::Platform(err.to_string()))?;

        let return_data: Option<UiTransactionReturnData> = transaction
            .transaction
            .meta
            .and_then(|meta| meta.return_data.into());

        let accepted = match return_data {
            Some(data) => {
                let bytes = BASE64
                    .decode(data.data.0)
                    .map_err(|err| VerifyError::Platform(format!("bad return data: {err}")))?;
                bytes.first() == Some(&1)
            }
            None => false,
        };

        if accepted {
            Ok(VerifyOutcome::Accepted)
        } else {
            Ok(VerifyOutcome::Rejected(RejectReason::PayloadMismatch))
        }
    }

    // ========================================================================
    // Chunked storage
    // ========================================================================

    pub fn storage_address(&self, dataset_id: &[u8; 32]) -> Pubkey {
        Pubkey::find_program_address(
            &[b"chunk_storage", self.payer.pubkey().as_ref(), dataset_id],
            &self.config.program_id,
        )
        .0
    }

    /// Uploads every chunk: init_storage carries chunk 0 and allocates
    /// the account, store_chunk carries the rest. Each chunk is one
    /// transaction.
    pub fn upload(&self, payload: &ChunkedPayload) -> Result<()> {
        for (index, chunk) in payload.chunks.iter().enumerate() {
            if index == 0 {
                self.init_storage(payload, chunk)?;
            } else {
                self.store_chunk(payload, index as u32, chunk)?;
            }
        }
        Ok(())
    }

    fn init_storage(&self, payload: &ChunkedPayload, chunk: &[u8]) -> Result<()> {
        let mut data = Vec::new();
        data.extend_from_slice(&INIT_STORAGE_DISCRIMINATOR);
        data.extend_from_slice(&payload.dataset_id);
        data.extend_from_slice(&payload.total_chunks().to_le_bytes());
        data.extend_from_slice(&payload.dataset_hash);
        append_bytes(&mut data, chunk);

        let instruction = Instruction {
            program_id: self.config.program_id,
            accounts: vec![
                AccountMeta::new(self.storage_address(&payload.dataset_id), false),
                AccountMeta::new(self.payer.pubkey(), true),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
            data,
        };
        self.send(&[instruction])
            .context("Failed to initialize chunk storage")?;
        Ok(())
    }

    fn store_chunk(&self, payload: &ChunkedPayload, index: u32, chunk: &[u8]) -> Result<()> {
        let mut data = Vec::new();
        data.extend_from_slice(&STORE_CHUNK_DISCRIMINATOR);
        data.extend_from_slice(&payload.dataset_id);
        data.extend_from_slice(&index.to_le_bytes());
        data.extend_from_slice(&payload.total_chunks().to_le_bytes());
        data.extend_from_slice(&payload.dataset_hash);
        append_bytes(&mut data, chunk);

        let instruction = Instruction {
            program_id: self.config.program_id,
            accounts: vec![
                AccountMeta::new(self.storage_address(&payload.dataset_id), false),
                AccountMeta::new_readonly(self.payer.pubkey(), true),
            ],
            data,
        };
        self.send(&[instruction])
            .with_context(|| format!("Failed to store chunk {index}"))?;
        Ok(())
    }

    pub fn get_data_metadata(&self, dataset_id: &[u8; 32]) -> Result<DatasetMetadata> {
        let instruction = Instruction {
            program_id: self.config.program_id,
            accounts: vec![
                AccountMeta::new_readonly(self.storage_address(dataset_id), false),
                AccountMeta::new_readonly(self.payer.pubkey(), true),
            ],
            data: GET_DATA_METADATA_DISCRIMINATOR.to_vec(),
        };

        // fixed borsh size: 32 + 4 + 4 + 32
        let bytes = self.simulate_for_return_data(instruction, 72)?;
        let metadata = DatasetMetadata::try_from_slice(&bytes)
            .context("Could not decode dataset metadata")?;
        Ok(metadata)
    }

    pub fn retrieve_chunk(&self, dataset_id: &[u8; 32], chunk_index: u32) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        data.extend_from_slice(&RETRIEVE_CHUNK_DISCRIMINATOR);
        data.extend_from_slice(&chunk_index.to_le_bytes());

        let instruction = Instruction {
            program_id: self.config.program_id,
            accounts: vec![
                AccountMeta::new_readonly(self.storage_address(dataset_id), false),
                AccountMeta::new_readonly(self.payer.pubkey(), true),
            ],
            data,
        };

        let bytes = self.simulate_for_return_data(instruction, 0)?;
        if bytes.len() < 4 {
            bail!("chunk return data shorter than its length prefix");
        }
        // borsh Vec<u8>: u32 length prefix, then the payload, with any
        // trailing zeros restored (see simulate_for_return_data)
        let expected = u32::from_le_bytes(bytes[..4].try_into().unwrap()) as usize;
        let mut chunk = bytes[4..].to_vec();
        if chunk.len() > expected {
            bail!("chunk return data longer than its length prefix");
        }
        chunk.resize(expected, 0);
        Ok(chunk)
    }

    /// Full retrieval: requires a complete upload, fetches every chunk in
    /// index order and hash-verifies the reassembly.
    pub fn download(&self, dataset_id: &[u8; 32]) -> Result<Vec<u8>> {
        let metadata = self.get_data_metadata(dataset_id)?;
        if !metadata.is_complete() {
            bail!(
                "dataset incomplete: {}/{} chunks stored",
                metadata.chunks_stored,
                metadata.total_chunks
            );
        }

        let mut chunks = Vec::with_capacity(metadata.total_chunks as usize);
        for index in 0..metadata.total_chunks {
            chunks.push(self.retrieve_chunk(dataset_id, index)?);
        }

        let data = reassemble(&chunks, &metadata.dataset_hash)?;
        Ok(data)
    }

    /// Reclaims the storage account. Closing before every needed read has
    /// completed loses the data - the protocol does not detect this, so
    /// call it only after `download` (or equivalent) succeeded.
    pub fn close_storage(&self, dataset_id: &[u8; 32]) -> Result<()> {
        let instruction = Instruction {
            program_id: self.config.program_id,
            accounts: vec![
                AccountMeta::new(self.storage_address(dataset_id), false),
                AccountMeta::new(self.payer.pubkey(), true),
            ],
            data: CLOSE_STORAGE_DISCRIMINATOR.to_vec(),
        };
        self.send(&[instruction])
            .context("Failed to close chunk storage")?;
        Ok(())
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    fn send(&self, instructions: &[Instruction]) -> Result<Signature> {
        let blockhash = self.rpc.get_latest_blockhash()?;
        let transaction = Transaction::new_signed_with_payer(
            instructions,
            Some(&self.payer.pubkey()),
            &[&self.payer],
            blockhash,
        );
        let signature = self.rpc.send_and_confirm_transaction(&transaction)?;
        Ok(signature)
    }

    /// Runs a read-only instruction through simulation and returns its
    /// return data. The platform strips trailing zero bytes from return
    /// data, so fixed-size payloads are padded back to `min_len`.
    fn simulate_for_return_data(
        &self,
        instruction: Instruction,
        min_len: usize,
    ) -> Result<Vec<u8>> {
        let blockhash = self.rpc.get_latest_blockhash()?;
        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&self.payer.pubkey()),
            &[&self.payer],
            blockhash,
        );

        let result = self.rpc.simulate_transaction(&transaction)?.value;
        if let Some(err) = result.err {
            bail!(
                "simulation failed: {err} (logs: {:?})",
                result.logs.unwrap_or_default()
            );
        }
        let return_data = result
            .return_data
            .ok_or_else(|| anyhow!("program returned no data"))?;

        let mut bytes = BASE64
            .decode(return_data.data.0)
            .context("return data is not valid base64")?;
        if bytes.len() < min_len {
            bytes.resize(min_len, 0);
        }
        Ok(bytes)
    }
}

/// borsh string: u32 little-endian byte length, then the bytes
fn append_string(data: &mut Vec<u8>, value: &str) {
    data.extend_from_slice(&(value.len() as u32).to_le_bytes());
    data.extend_from_slice(value.as_bytes());
}

/// borsh Vec<u8>: u32 little-endian length, then the bytes
fn append_bytes(data: &mut Vec<u8>, value: &[u8]) {
    data.extend_from_slice(&(value.len() as u32).to_le_bytes());
    data.extend_from_slice(value);
}

fn decode_hex(input: &str) -> Result<Vec<u8>, VerifyError> {
    let stripped = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(stripped).map_err(|err| VerifyError::BadRequest(format!("not hex: {err}")))
}
