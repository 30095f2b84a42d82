//! Sync reconciler: merge a freshly fetched roster and punch log into the
//! store without duplicating punches or clobbering local edits.

use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{ensure_user, insert_punch, upsert_roster_user};
use crate::device::{DeviceClient, DeviceConfig, DeviceInfo, RawUser};
use crate::errors::AppResult;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, Serialize)]
pub struct SyncReport {
    pub users_added: u64,
    pub users_unchanged: u64,
    pub punches_added: u64,
    pub punches_skipped: u64,
}

pub struct SyncLogic;

impl SyncLogic {
    /// Run one full sync pass.
    ///
    /// Probes first and aborts before any write when the device is
    /// unreachable. The roster pass and the punch pass each run as one
    /// transaction: a mid-stream failure leaves the last committed batch in
    /// place and surfaces the error for the caller to retry.
    pub fn run(
        pool: &mut DbPool,
        client: &dyn DeviceClient,
        cfg: &DeviceConfig,
    ) -> AppResult<(DeviceInfo, SyncReport)> {
        let mut report = SyncReport::default();

        // 1) Fail fast: no partial writes when the device is down.
        let info = client.probe(cfg)?;

        // 2) Roster pass.
        //
        // Some firmware emits the same user id twice in one dump; collapse
        // the batch first, last occurrence wins.
        let roster = client.fetch_roster(cfg)?;
        let mut batch: BTreeMap<i64, RawUser> = BTreeMap::new();
        for user in roster {
            batch.insert(user.user_id, user);
        }

        let tx = pool.conn.transaction()?;
        for user in batch.values() {
            if upsert_roster_user(&tx, user.user_id, user.name.as_deref())? {
                report.users_added += 1;
            } else {
                report.users_unchanged += 1;
            }
        }
        tx.commit()?;

        // 3) Punch pass.
        //
        // The device hands out its full log every time; the UNIQUE key on
        // (user_id, timestamp) turns re-seen punches into counted skips. A
        // punch for a user the roster never mentioned still lands: a
        // placeholder row is created on the fly.
        let punches = client.fetch_punches(cfg)?;

        let tx = pool.conn.transaction()?;
        for punch in &punches {
            if ensure_user(&tx, punch.user_id)? {
                report.users_added += 1;
            }
            if insert_punch(
                &tx,
                punch.user_id,
                &punch.timestamp,
                punch.punch_type,
                punch.verify_method,
            )? {
                report.punches_added += 1;
            } else {
                report.punches_skipped += 1;
            }
        }
        tx.commit()?;

        // 4) Audit trail (non-blocking).
        let _ = ttlog(
            &pool.conn,
            "sync",
            &info.serial,
            &format!(
                "synced {} from {}: +{} users, +{} punches ({} skipped)",
                info.serial, cfg.host, report.users_added, report.punches_added, report.punches_skipped
            ),
        );

        Ok((info, report))
    }
}
