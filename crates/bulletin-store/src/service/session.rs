//! The block-session facade tying deliveries to one atomic commit.

use std::collections::HashSet;

use bulletin_proto::{Bulletin, BulletinType, TopicHash, TxEnvelope};

use crate::domain::config::StoreConfig;
use crate::domain::errors::{DeliverResponse, ResponseCode, StoreError};
use crate::domain::url::GanyUrl;
use crate::ports::inbound::BulletinRegistryApi;
use crate::ports::outbound::{OrderedKvStore, TimeSource, WriteBatch};
use crate::service::store::BulletinStore;
use crate::service::{query, resolver};

/// One open block: the staged write batch plus the delivery cursor.
struct BlockSession {
    batch: Box<dyn WriteBatch>,
    height: i64,
    block_time: i64,
    tx_index: i64,
}

/// The per-shard registry service.
///
/// Owns the store handle and the clock; holds at most one open block
/// session at a time. The consensus driver calls the write side
/// serially; readers go through committed snapshots and never touch the
/// session.
pub struct BulletinRegistry<S, T>
where
    S: OrderedKvStore,
    T: TimeSource,
{
    store: S,
    clock: T,
    engine: BulletinStore,
    session: Option<BlockSession>,
}

impl<S, T> BulletinRegistry<S, T>
where
    S: OrderedKvStore,
    T: TimeSource,
{
    pub fn new(store: S, clock: T, config: StoreConfig) -> Self {
        Self {
            store,
            clock,
            engine: BulletinStore::new(config),
            session: None,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        self.engine.config()
    }

    /// Whether a block session is currently open.
    pub fn in_block(&self) -> bool {
        self.session.is_some()
    }

    /// Drop the open session without committing, rolling the block back.
    pub fn abort_block(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::warn!(height = session.height, "block session aborted");
        }
    }
}

impl<S, T> BulletinRegistryApi for BulletinRegistry<S, T>
where
    S: OrderedKvStore,
    T: TimeSource,
{
    fn begin_block(&mut self, height: i64, block_time_sec: i64) -> Result<(), StoreError> {
        let batch = self.store.begin()?;
        self.session = Some(BlockSession {
            batch,
            height,
            block_time: block_time_sec,
            tx_index: 0,
        });
        Ok(())
    }

    fn check_tx(&self, tx: &[u8]) -> DeliverResponse {
        let envelope = TxEnvelope::from_bytes(tx.to_vec());
        match envelope.validate() {
            Ok(()) => DeliverResponse::ok(),
            Err(err) => DeliverResponse {
                code: ResponseCode::from(&err),
                log: err.to_string(),
            },
        }
    }

    fn deliver_tx(&mut self, tx: &[u8]) -> DeliverResponse {
        let envelope = TxEnvelope::from_bytes(tx.to_vec());
        if let Err(err) = envelope.validate() {
            return DeliverResponse {
                code: ResponseCode::from(&err),
                log: err.to_string(),
            };
        }

        let session = match self.session.as_mut() {
            Some(session) => session,
            None => {
                return DeliverResponse {
                    code: ResponseCode::Other,
                    log: "no open block session".to_string(),
                }
            }
        };

        let now = self.clock.now();
        match self.engine.put(
            session.batch.as_mut(),
            &envelope,
            session.block_time,
            session.tx_index,
            now,
        ) {
            Ok(()) => {
                session.tx_index += 1;
                DeliverResponse::ok()
            }
            Err(err) => {
                tracing::error!(
                    height = session.height,
                    tx_index = session.tx_index,
                    error = %err,
                    "put bulletin failed"
                );
                DeliverResponse {
                    code: ResponseCode::from(&err),
                    log: err.to_string(),
                }
            }
        }
    }

    fn end_block(&mut self, _height: i64) {}

    fn commit(&mut self) -> Result<(), StoreError> {
        let session = self.session.take().ok_or_else(|| StoreError::Store {
            message: "commit without an open block session".to_string(),
        })?;
        session.batch.commit()?;
        tracing::debug!(height = session.height, txs = session.tx_index, "block committed");
        Ok(())
    }

    fn get_by_url(&self, url: &GanyUrl) -> Result<Vec<u8>, StoreError> {
        let view = self.store.view()?;
        resolver::get_by_url(view.as_ref(), url)
    }

    fn query_by_topic_and_time(
        &self,
        bulletin_type: BulletinType,
        topic_hash: &TopicHash,
        start_sec: i64,
        end_sec: i64,
        exclude_sns: &HashSet<String>,
    ) -> Result<Vec<Bulletin>, StoreError> {
        let view = self.store.view()?;
        let (bulletins, _count) = query::query_by_topic_and_time(
            view.as_ref(),
            self.engine.config(),
            bulletin_type,
            topic_hash,
            start_sec,
            end_sec,
            exclude_sns,
        )?;
        Ok(bulletins)
    }
}
