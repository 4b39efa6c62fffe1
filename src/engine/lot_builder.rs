// ==========================================
// 预制构件日产组合排产 - 批次构建器
// ==========================================
// 职责: 规范化构件 → 生产批次（按 合同/阶段/序列/类型/配筋/截面 分组）
// 输出: 正体积批次 + 每个序列的批次队列 + 待处理项（缺主键 / 零体积）
// ==========================================

use crate::domain::lot::{Lot, LotId};
use crate::domain::mix::PendingItem;
use crate::domain::piece::PieceRecord;
use crate::domain::sequence::SequenceKey;
use crate::domain::types::PendingReason;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

// ==========================================
// LotBuildResult - 批次构建结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct LotBuildResult {
    /// 体积 > 0 的批次，LotId 即下标
    pub lots: Vec<Lot>,
    /// 序列 → 批次队列（已按 换模签名/类型/配筋 排序）
    pub queues: BTreeMap<SequenceKey, Vec<LotId>>,
    /// 缺主键的构件行（完整列表，展示截断由调用方负责）
    pub missing_key: Vec<PendingItem>,
    /// 体积 <= 0 的批次
    pub zero_volume: Vec<PendingItem>,
    /// 参与分组的构件行数
    pub grouped_rows: usize,
}

impl LotBuildResult {
    pub fn has_lots(&self) -> bool {
        !self.lots.is_empty()
    }
}

// 截面尺寸作为分组键（全序比较）
#[derive(Debug, Clone, Copy)]
struct Dim(f64);

impl PartialEq for Dim {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Dim {}

impl PartialOrd for Dim {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dim {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    key: SequenceKey,
    typology: String,
    reinforcement: String,
    height: Dim,
    width: Dim,
}

#[derive(Debug, Default)]
struct GroupTotals {
    volume_m3: f64,
    length_m: f64,
    piece_names: BTreeSet<String>,
}

// ==========================================
// LotBuilder - 批次构建器（无状态）
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct LotBuilder;

impl LotBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 构建批次
    ///
    /// 规则:
    /// 1) CT / ETAPA / SEQUENCIA 任一为空 → 待处理 MISSING_KEY，不参与分组
    /// 2) 类型、配筋转大写；截面缺失按 0
    /// 3) 体积合计 <= 0 的批次丢弃并记为 ZERO_VOLUME_LOT
    /// 4) 序列内批次按 (换模签名, 类型, 配筋, 底宽, 侧高) 升序
    #[instrument(skip(self, pieces), fields(rows = pieces.len()))]
    pub fn build(&self, pieces: &[PieceRecord]) -> LotBuildResult {
        let mut result = LotBuildResult::default();
        let mut groups: BTreeMap<GroupKey, GroupTotals> = BTreeMap::new();

        for piece in pieces {
            if !piece.has_key() {
                result.missing_key.push(PendingItem {
                    reason: PendingReason::MissingKey,
                    ct: Some(piece.ct.clone()),
                    etapa: Some(piece.etapa.clone()),
                    sequence: Some(piece.sequence_key.clone()),
                    piece_name: Some(piece.piece_name.clone()),
                    row_number: Some(piece.row_number),
                    remaining_volume_m3: None,
                });
                continue;
            }

            result.grouped_rows += 1;
            let group = GroupKey {
                key: SequenceKey::new(&piece.ct, &piece.etapa, &piece.sequence_key),
                typology: piece.typology.to_uppercase(),
                reinforcement: piece.reinforcement.to_uppercase(),
                height: Dim(normalize_dim(piece.height_cm)),
                width: Dim(normalize_dim(piece.width_cm)),
            };

            let totals = groups.entry(group).or_default();
            totals.volume_m3 += piece.total_volume_m3();
            totals.length_m += piece.total_length_m();
            if !piece.piece_name.is_empty() {
                totals.piece_names.insert(piece.piece_name.clone());
            }
        }

        if !result.missing_key.is_empty() {
            debug!(count = result.missing_key.len(), "构件缺少 CT/ETAPA/SEQUENCIA");
        }

        // 按序列收集候选批次
        let mut by_sequence: BTreeMap<SequenceKey, Vec<Lot>> = BTreeMap::new();
        for (group, totals) in groups {
            if totals.volume_m3 <= 0.0 {
                result.zero_volume.push(PendingItem {
                    reason: PendingReason::ZeroVolumeLot,
                    ct: Some(group.key.ct.clone()),
                    etapa: Some(group.key.etapa.clone()),
                    sequence: Some(group.key.sequence.clone()),
                    piece_name: Some(totals.piece_names.iter().cloned().collect::<Vec<_>>().join(";")),
                    row_number: None,
                    remaining_volume_m3: None,
                });
                continue;
            }

            let setup = Lot::setup_signature(group.height.0, group.width.0);
            by_sequence.entry(group.key.clone()).or_default().push(Lot {
                id: LotId(0),
                key: group.key,
                typology: group.typology,
                reinforcement: group.reinforcement,
                height_cm: group.height.0,
                width_cm: group.width.0,
                setup,
                total_volume_m3: totals.volume_m3,
                total_length_m: totals.length_m,
                piece_names: totals.piece_names.into_iter().collect(),
            });
        }

        // 队列排序 + 分配 LotId
        for (key, mut lots) in by_sequence {
            lots.sort_by(compare_queue_order);
            let mut queue = Vec::with_capacity(lots.len());
            for mut lot in lots {
                let id = LotId(result.lots.len());
                lot.id = id;
                queue.push(id);
                result.lots.push(lot);
            }
            result.queues.insert(key, queue);
        }

        info!(
            lots = result.lots.len(),
            sequences = result.queues.len(),
            missing_key = result.missing_key.len(),
            zero_volume = result.zero_volume.len(),
            "批次构建完成"
        );
        result
    }
}

/// 截面尺寸：缺失按 0，消除 -0.0
fn normalize_dim(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v != 0.0 => v,
        _ => 0.0,
    }
}

/// 序列内批次处理顺序
fn compare_queue_order(a: &Lot, b: &Lot) -> Ordering {
    a.setup
        .cmp(&b.setup)
        .then_with(|| a.typology.cmp(&b.typology))
        .then_with(|| a.reinforcement.cmp(&b.reinforcement))
        .then_with(|| a.height_cm.total_cmp(&b.height_cm))
        .then_with(|| a.width_cm.total_cmp(&b.width_cm))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(ct: &str, seq: &str, typ: &str, h: f64, w: f64, vol: f64, name: &str) -> PieceRecord {
        PieceRecord {
            row_number: 1,
            ct: ct.to_string(),
            etapa: "E1".to_string(),
            sequence_key: seq.to_string(),
            piece_name: name.to_string(),
            typology: typ.to_string(),
            reinforcement: "ca50".to_string(),
            height_cm: Some(h),
            width_cm: Some(w),
            quantity: Some(2.0),
            unit_length_m: Some(5.0),
            volume_m3: Some(vol),
        }
    }

    #[test]
    fn test_groups_by_section_and_uppercases() {
        let pieces = vec![
            piece("C1", "1", "viga", 20.0, 40.0, 1.0, "V2"),
            piece("C1", "1", "VIGA", 20.0, 40.0, 2.0, "V1"),
            piece("C1", "1", "VIGA", 20.0, 40.0, 0.5, "V1"),
            piece("C1", "1", "PILAR", 30.0, 30.0, 3.0, "P1"),
        ];

        let result = LotBuilder::new().build(&pieces);
        assert_eq!(result.lots.len(), 2);

        let viga = result.lots.iter().find(|l| l.typology == "VIGA").unwrap();
        assert!((viga.total_volume_m3 - 3.5).abs() < 1e-12);
        assert!((viga.total_length_m - 30.0).abs() < 1e-12);
        assert_eq!(viga.piece_names, vec!["V1".to_string(), "V2".to_string()]);
        assert_eq!(viga.reinforcement, "CA50");
        assert_eq!(viga.setup, "20x40");
    }

    #[test]
    fn test_queue_order_by_setup_then_typology() {
        let pieces = vec![
            piece("C1", "1", "VIGA", 30.0, 30.0, 1.0, "A"),
            piece("C1", "1", "LAJE", 30.0, 30.0, 1.0, "B"),
            piece("C1", "1", "PILAR", 20.0, 40.0, 1.0, "C"),
        ];

        let result = LotBuilder::new().build(&pieces);
        let queue = &result.queues[&SequenceKey::new("C1", "E1", "1")];
        let order: Vec<&str> = queue
            .iter()
            .map(|id| result.lots[id.index()].typology.as_str())
            .collect();
        assert_eq!(order, vec!["PILAR", "LAJE", "VIGA"]);
        // LotId 与下标一致
        for (idx, lot) in result.lots.iter().enumerate() {
            assert_eq!(lot.id.index(), idx);
        }
    }

    #[test]
    fn test_missing_key_rows_become_pending() {
        let mut orphan = piece("", "1", "VIGA", 20.0, 40.0, 1.0, "X1");
        orphan.row_number = 7;
        let pieces = vec![orphan, piece("C1", "1", "VIGA", 20.0, 40.0, 1.0, "V1")];

        let result = LotBuilder::new().build(&pieces);
        assert_eq!(result.missing_key.len(), 1);
        assert_eq!(result.missing_key[0].reason, PendingReason::MissingKey);
        assert_eq!(result.missing_key[0].row_number, Some(7));
        assert_eq!(result.grouped_rows, 1);
        assert_eq!(result.lots.len(), 1);
    }

    #[test]
    fn test_zero_volume_lots_are_dropped() {
        let mut no_volume = piece("C1", "2", "VIGA", 20.0, 40.0, 0.0, "V9");
        no_volume.volume_m3 = None;
        let pieces = vec![no_volume, piece("C1", "1", "VIGA", 20.0, 40.0, 1.0, "V1")];

        let result = LotBuilder::new().build(&pieces);
        assert_eq!(result.lots.len(), 1);
        assert_eq!(result.zero_volume.len(), 1);
        assert_eq!(result.zero_volume[0].sequence.as_deref(), Some("2"));
        assert!(!result.queues.contains_key(&SequenceKey::new("C1", "E1", "2")));
    }

    #[test]
    fn test_missing_section_defaults_to_zero() {
        let mut p = piece("C1", "1", "VIGA", 0.0, 0.0, 1.0, "V1");
        p.height_cm = None;
        p.width_cm = Some(-0.0);
        let result = LotBuilder::new().build(&[p]);
        assert_eq!(result.lots[0].setup, "0x0");
        assert_eq!(result.lots[0].height_cm, 0.0);
    }
}
