//! レコードストア
//!
//! 挿入順のレコード列を保持し、変更のたびに永続スロットへ全件を書き込む。
//! 永続化先は`Slot`で抽象化する（CLIはファイル、テストはメモリ）。

use crate::error::Result;
use crate::types::{JobRecord, RecordPatch};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// 永続化スロット（キー1つ分の保存領域）
pub trait Slot {
    /// 保存済みの内容。未保存ならNone
    ///
    /// 読み込みに失敗した場合はエラー（未保存とは区別する）
    fn read(&self) -> Result<Option<String>>;

    /// 内容を丸ごと書き込む
    fn write(&mut self, data: &str) -> Result<()>;
}

/// メモリ上のスロット
///
/// クローンは同じ領域を共有するので、書き込み結果を外から確認できる。
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    data: Rc<RefCell<Option<String>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self { data: Rc::new(RefCell::new(Some(contents.into()))) }
    }

    pub fn contents(&self) -> Option<String> {
        self.data.borrow().clone()
    }
}

impl Slot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&mut self, data: &str) -> Result<()> {
        *self.data.borrow_mut() = Some(data.to_string());
        Ok(())
    }
}

/// 単調増加するID生成器
///
/// ミリ秒時刻を候補にするが、同じミリ秒で複数作っても衝突しないよう
/// 直前のIDより必ず大きい値を返す。
#[derive(Debug, Clone, Copy, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    /// 既存IDの最大値を下限として取り込む
    pub fn observe(&mut self, id: i64) {
        self.last = self.last.max(id);
    }

    pub fn next(&mut self, candidate: i64) -> i64 {
        let id = candidate.max(self.last + 1);
        self.last = id;
        id
    }
}

/// 変更前の状態（保存に失敗したときの巻き戻し先）
#[derive(Debug, Clone)]
pub(crate) struct Checkpoint {
    records: Vec<JobRecord>,
    ids: IdGenerator,
}

/// 応募レコードのストア
pub struct RecordStore {
    records: Vec<JobRecord>,
    slot: Box<dyn Slot>,
    ids: IdGenerator,
}

impl RecordStore {
    /// スロットから読み込む
    ///
    /// 未保存・破損している場合は空のストアとして扱う（エラーにしない）。
    /// スロット自体が読めない場合のみエラー。
    pub fn load(slot: Box<dyn Slot>) -> Result<Self> {
        let records = match slot.read()? {
            None => Vec::new(),
            Some(content) => match serde_json::from_str::<Vec<JobRecord>>(&content) {
                Ok(records) => records,
                Err(e) => {
                    warn!("persisted records are malformed, starting empty: {}", e);
                    Vec::new()
                }
            },
        };

        let mut ids = IdGenerator::default();
        for record in &records {
            ids.observe(record.id);
        }
        debug!(count = records.len(), "record store loaded");

        Ok(Self { records, slot, ids })
    }

    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&JobRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains_id(&self, id: i64) -> bool {
        self.get(id).is_some()
    }

    /// 会社名と職種の組が既に存在するか
    pub fn contains_pair(&self, company: &str, role: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.company == company && r.role == role)
    }

    /// 次のIDを払い出す
    pub fn next_id(&mut self, candidate: i64) -> i64 {
        self.ids.next(candidate)
    }

    /// 末尾に追加して保存
    pub fn add(&mut self, record: JobRecord) -> Result<()> {
        let checkpoint = self.checkpoint();
        self.push(record);
        self.commit(checkpoint)
    }

    /// IDで削除して保存（存在しなければ何もしない）
    pub fn remove(&mut self, id: i64) -> Result<bool> {
        let Some(index) = self.records.iter().position(|r| r.id == id) else {
            return Ok(false);
        };
        let checkpoint = self.checkpoint();
        self.records.remove(index);
        self.commit(checkpoint)?;
        Ok(true)
    }

    /// 部分更新して保存（存在しなければ何もしない）
    pub fn update(&mut self, id: i64, patch: RecordPatch) -> Result<bool> {
        let Some(index) = self.records.iter().position(|r| r.id == id) else {
            return Ok(false);
        };
        let checkpoint = self.checkpoint();
        patch.apply(&mut self.records[index]);
        self.commit(checkpoint)?;
        Ok(true)
    }

    /// 全件をスロットへ書き込む
    pub fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.records)?;
        self.slot.write(&json)?;
        debug!(count = self.records.len(), "records persisted");
        Ok(())
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            records: self.records.clone(),
            ids: self.ids,
        }
    }

    /// 保存する。失敗したらチェックポイントの状態に戻してエラーを返す
    pub(crate) fn commit(&mut self, checkpoint: Checkpoint) -> Result<()> {
        if let Err(e) = self.persist() {
            warn!("persist failed, rolling back: {}", e);
            self.records = checkpoint.records;
            self.ids = checkpoint.ids;
            return Err(e);
        }
        Ok(())
    }

    /// 保存せずに追加（一括取り込み用、呼び出し側で最後にcommitする）
    pub(crate) fn push(&mut self, record: JobRecord) {
        self.ids.observe(record.id);
        self.records.push(record);
    }

    pub(crate) fn records_mut(&mut self) -> &mut [JobRecord] {
        &mut self.records
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("records", &self.records)
            .field("ids", &self.ids)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{FollowUp, Status};

    /// 読み込みは成功し、書き込みは常に失敗するスロット
    struct ReadOnlySlot(Option<String>);

    impl Slot for ReadOnlySlot {
        fn read(&self) -> Result<Option<String>> {
            Ok(self.0.clone())
        }

        fn write(&mut self, _data: &str) -> Result<()> {
            Err(Error::Storage("read-only".to_string()))
        }
    }

    struct UnreadableSlot;

    impl Slot for UnreadableSlot {
        fn read(&self) -> Result<Option<String>> {
            Err(Error::Storage("permission denied".to_string()))
        }

        fn write(&mut self, _data: &str) -> Result<()> {
            Ok(())
        }
    }

    fn record(id: i64, company: &str, role: &str) -> JobRecord {
        JobRecord {
            id,
            company: company.to_string(),
            role: role.to_string(),
            date: "2024-03-15".to_string(),
            status: Status::Applied,
            follow_up: FollowUp::Pending,
            notes: String::new(),
            link: None,
        }
    }

    #[test]
    fn test_load_absent_slot_is_empty() {
        let store = RecordStore::load(Box::new(MemorySlot::new())).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_corrupted_slot_is_empty() {
        let store = RecordStore::load(Box::new(MemorySlot::with_contents("{ invalid json }"))).unwrap();
        assert!(store.is_empty());

        let store = RecordStore::load(Box::new(MemorySlot::with_contents(r#"{"id": 1}"#))).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_persists_and_reloads_in_order() {
        let slot = MemorySlot::new();
        let mut store = RecordStore::load(Box::new(slot.clone())).unwrap();
        store.add(record(1, "Acme", "Engineer")).unwrap();
        store.add(record(2, "Globex", "Analyst")).unwrap();

        let reloaded = RecordStore::load(Box::new(slot)).unwrap();
        assert_eq!(reloaded.records(), store.records());
        assert_eq!(reloaded.records()[0].company, "Acme");
        assert_eq!(reloaded.records()[1].company, "Globex");
    }

    #[test]
    fn test_add_then_remove_restores_previous_set() {
        let slot = MemorySlot::new();
        let mut store = RecordStore::load(Box::new(slot.clone())).unwrap();
        store.add(record(1, "Acme", "Engineer")).unwrap();
        let before = store.records().to_vec();
        let persisted_before = slot.contents();

        store.add(record(2, "Globex", "Analyst")).unwrap();
        assert!(store.remove(2).unwrap());

        assert_eq!(store.records(), before.as_slice());
        assert_eq!(slot.contents(), persisted_before);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let slot = MemorySlot::new();
        let mut store = RecordStore::load(Box::new(slot.clone())).unwrap();
        store.add(record(1, "Acme", "Engineer")).unwrap();

        assert!(!store.remove(99).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_patch() {
        let mut store = RecordStore::load(Box::new(MemorySlot::new())).unwrap();
        store.add(record(1, "Acme", "Engineer")).unwrap();

        assert!(store.update(1, RecordPatch::status(Status::Interview)).unwrap());
        assert!(store.update(1, RecordPatch::notes("call on monday")).unwrap());
        assert!(!store.update(7, RecordPatch::follow_up(FollowUp::Done)).unwrap());

        let updated = store.get(1).unwrap();
        assert_eq!(updated.status, Status::Interview);
        assert_eq!(updated.notes, "call on monday");
        assert_eq!(updated.follow_up, FollowUp::Pending);
    }

    #[test]
    fn test_contains_pair_is_exact() {
        let mut store = RecordStore::load(Box::new(MemorySlot::new())).unwrap();
        store.add(record(1, "Acme", "Engineer")).unwrap();

        assert!(store.contains_pair("Acme", "Engineer"));
        assert!(!store.contains_pair("Acme", "Designer"));
        assert!(!store.contains_pair("Engineer", "Acme"));
    }

    #[test]
    fn test_id_generator_is_strictly_increasing() {
        let mut ids = IdGenerator::default();
        let a = ids.next(1000);
        let b = ids.next(1000);
        let c = ids.next(999);
        assert_eq!((a, b, c), (1000, 1001, 1002));
        assert_eq!(ids.next(5000), 5000);
    }

    #[test]
    fn test_next_id_skips_loaded_ids() {
        let slot = MemorySlot::new();
        let mut store = RecordStore::load(Box::new(slot.clone())).unwrap();
        store.add(record(2_000, "Acme", "Engineer")).unwrap();

        let mut reloaded = RecordStore::load(Box::new(slot)).unwrap();
        assert_eq!(reloaded.next_id(1_500), 2_001);
    }

    #[test]
    fn test_load_unreadable_slot_is_error() {
        assert!(matches!(RecordStore::load(Box::new(UnreadableSlot)), Err(Error::Storage(_))));
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let initial = serde_json::to_string(&vec![record(1, "Acme", "Engineer")]).unwrap();
        let mut store = RecordStore::load(Box::new(ReadOnlySlot(Some(initial)))).unwrap();
        let before = store.records().to_vec();

        assert!(store.add(record(2, "Globex", "Analyst")).is_err());
        assert!(store.update(1, RecordPatch::status(Status::Offer)).is_err());
        assert!(store.remove(1).is_err());

        assert_eq!(store.records(), before.as_slice());
        // 巻き戻し後もIDは既存の最大値の次から
        assert_eq!(store.next_id(0), 2);
    }
}
