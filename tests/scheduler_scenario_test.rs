// ==========================================
// 日产组合排产 - 场景与性质测试
// ==========================================
// 测试目标: 逐日分配的产能守恒、体积守恒、窗口约束、序列严格顺序、幂等性
// ==========================================


use chrono::NaiveDate;
use precast_mix::domain::{MixOutputs, PendingReason, RawPieceRecord, RawSequenceRecord};
use precast_mix::engine::{MixScheduler, Normalizer, DRAIN_EPSILON};
use std::collections::{BTreeMap, HashMap};
use test_helpers::{approx_eq, piece, piece_with_section, window};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn run(pieces: &[RawPieceRecord], windows: &[RawSequenceRecord], capacity: f64) -> MixOutputs {
    MixScheduler::new().build_mix(pieces, windows, capacity, true)
}

/// 多合同、多阶段、多序列的混合输入
fn mixed_inputs() -> (Vec<RawPieceRecord>, Vec<RawSequenceRecord>) {
    let pieces = vec![
        piece("C1", "E1", "1 - SETOR A", "VIGA", 18.0),
        piece_with_section("C1", "E1", "1", "PILAR", "30", "30", 12.5),
        piece("C1", "E1", "2", "VIGA", 25.0),
        piece("C1", "E2", "1", "LAJE", 40.0),
        piece("C2", "E1", "03", "VIGA", 9.0),
        piece_with_section("C2", "E1", "4", "VIGA", "25,5", "40", 14.0),
        piece("C2", "E1", "4", "VIGA", 6.0),
    ];
    let windows = vec![
        window("C1", "E1", "1", "01/01/2024", "03/01/2024"),
        window("C1", "E1", "2", "02/01/2024", "10/01/2024"),
        window("C1", "E2", "1", "04/01/2024", "05/01/2024"),
        window("C2", "E1", "3", "01/01/2024", "02/01/2024"),
        window("C2", "E1", "4", "08/01/2024", "09/01/2024"),
    ];
    (pieces, windows)
}

// ==========================================
// 场景测试
// ==========================================

#[test]
fn test_two_business_days_split() {
    println!("\n=== 测试：50 m³ 在两个工作日内按 30/20 分配 ===");

    let outputs = run(
        &[piece("C1", "E1", "1", "VIGA", 50.0)],
        &[window("C1", "E1", "1", "01/01/2024", "02/01/2024")],
        30.0,
    );

    assert_eq!(outputs.daily_mix.len(), 2, "应有两天的组合行");
    assert_eq!(outputs.daily_mix[0].date, ymd(2024, 1, 1));
    assert!(approx_eq(outputs.daily_mix[0].volume_m3, 30.0), "第一天 30 m³");
    assert_eq!(outputs.daily_mix[1].date, ymd(2024, 1, 2));
    assert!(approx_eq(outputs.daily_mix[1].volume_m3, 20.0), "第二天 20 m³");
    assert!(outputs.pending.is_empty(), "不应有待处理项");
    println!("✓ 30 + 20 分配正确");
}

#[test]
fn test_single_day_window_leaves_pending() {
    println!("\n=== 测试：单日窗口剩余 20 m³ 记为待处理 ===");

    let outputs = run(
        &[piece("C1", "E1", "1", "VIGA", 50.0)],
        &[window("C1", "E1", "1", "01/01/2024", "01/01/2024")],
        30.0,
    );

    assert_eq!(outputs.daily_mix.len(), 1);
    assert!(approx_eq(outputs.daily_mix[0].volume_m3, 30.0));
    assert_eq!(outputs.pending.len(), 1);

    let item = &outputs.pending[0];
    assert_eq!(item.reason, PendingReason::DidNotFit);
    assert_eq!(item.ct.as_deref(), Some("C1"));
    assert_eq!(item.etapa.as_deref(), Some("E1"));
    assert_eq!(item.sequence.as_deref(), Some("1"));
    assert!(approx_eq(item.remaining_volume_m3.unwrap(), 20.0), "剩余 20 m³");
}

#[test]
fn test_later_sequence_waits_for_earlier() {
    println!("\n=== 测试：后续序列等待前序序列排完 ===");

    // 序列 2 的窗口从第一天开始，但序列 1 需要两天才能排完
    let outputs = run(
        &[
            piece("C1", "E1", "1", "VIGA", 50.0),
            piece("C1", "E1", "2", "LAJE", 10.0),
        ],
        &[
            window("C1", "E1", "1", "01/01/2024", "05/01/2024"),
            window("C1", "E1", "2", "01/01/2024", "05/01/2024"),
        ],
        30.0,
    );

    let day1: Vec<_> = outputs
        .allocations
        .iter()
        .filter(|e| e.date == ymd(2024, 1, 1))
        .collect();
    assert!(
        day1.iter().all(|e| e.sequence == "1"),
        "第一天只能排序列 1"
    );

    // 事件顺序中序列 1 的全部分配先于序列 2
    let last_seq1 = outputs
        .allocations
        .iter()
        .rposition(|e| e.sequence == "1")
        .unwrap();
    let first_seq2 = outputs
        .allocations
        .iter()
        .position(|e| e.sequence == "2")
        .unwrap();
    assert!(last_seq1 < first_seq2, "序列 2 必须在序列 1 排完之后");
    assert!(outputs.pending.is_empty());
}

#[test]
fn test_stream_waits_outside_window() {
    println!("\n=== 测试：当前序列不在窗口内时作业流等待，不跳序 ===");

    // 序列 1 窗口在第三天开始；序列 2 窗口覆盖第一天
    let outputs = run(
        &[
            piece("C1", "E1", "1", "VIGA", 10.0),
            piece("C1", "E1", "2", "VIGA", 10.0),
        ],
        &[
            window("C1", "E1", "1", "03/01/2024", "03/01/2024"),
            window("C1", "E1", "2", "01/01/2024", "03/01/2024"),
        ],
        30.0,
    );

    assert!(
        outputs.allocations.iter().all(|e| e.date == ymd(2024, 1, 3)),
        "前两天不得有任何分配"
    );
    assert_eq!(outputs.daily_mix.len(), 1, "同日同换模合并为一行");
    assert!(approx_eq(outputs.daily_mix[0].volume_m3, 20.0));
    assert_eq!(outputs.daily_mix[0].sequences, vec!["1".to_string(), "2".to_string()]);
}

#[test]
fn test_streams_share_daily_capacity_in_order() {
    println!("\n=== 测试：作业流按 (合同, 阶段) 顺序共享日产能 ===");

    let outputs = run(
        &[
            piece("C2", "E1", "1", "VIGA", 20.0),
            piece("C1", "E1", "1", "VIGA", 20.0),
        ],
        &[
            window("C1", "E1", "1", "01/01/2024", "02/01/2024"),
            window("C2", "E1", "1", "01/01/2024", "02/01/2024"),
        ],
        30.0,
    );

    let day1: Vec<_> = outputs
        .allocations
        .iter()
        .filter(|e| e.date == ymd(2024, 1, 1))
        .collect();
    assert_eq!(day1[0].ct, "C1", "C1 先于 C2");
    assert!(approx_eq(day1[0].volume_m3, 20.0));
    assert_eq!(day1[1].ct, "C2");
    assert!(approx_eq(day1[1].volume_m3, 10.0));
    assert!(outputs.pending.is_empty());
}

#[test]
fn test_weekend_skipped_in_business_day_mode() {
    println!("\n=== 测试：工作日模式跳过周末 ===");

    // 2024-01-05 周五 → 2024-01-08 周一
    let pieces = [piece("C1", "E1", "1", "VIGA", 60.0)];
    let windows = [window("C1", "E1", "1", "05/01/2024", "08/01/2024")];

    let business = MixScheduler::new().build_mix(&pieces, &windows, 30.0, true);
    let dates: Vec<NaiveDate> = business.daily_mix.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![ymd(2024, 1, 5), ymd(2024, 1, 8)]);

    let calendar = MixScheduler::new().build_mix(&pieces, &windows, 30.0, false);
    let dates: Vec<NaiveDate> = calendar.daily_mix.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![ymd(2024, 1, 5), ymd(2024, 1, 6)], "自然日模式周六可排");
}

#[test]
fn test_sequence_without_window_is_pending() {
    let outputs = run(
        &[
            piece("C1", "E1", "1", "VIGA", 5.0),
            piece("C1", "E1", "9", "VIGA", 7.0),
        ],
        &[window("C1", "E1", "1", "01/01/2024", "01/01/2024")],
        30.0,
    );

    assert_eq!(outputs.pending.len(), 1);
    assert_eq!(outputs.pending[0].sequence.as_deref(), Some("9"));
    assert!(approx_eq(outputs.pending[0].remaining_volume_m3.unwrap(), 7.0));
}

#[test]
fn test_zero_padded_sequence_joins_integer_window() {
    println!("\n=== 测试：序列 \"03\" 与窗口 \"3\" 按整数键关联 ===");

    let outputs = run(
        &[piece("C1", "E1", "03 - SETOR B", "VIGA", 9.0)],
        &[window("C1", "E1", "3", "01/01/2024", "01/01/2024")],
        30.0,
    );

    assert!(outputs.pending.is_empty(), "补零序列应与整数窗口关联");
    assert_eq!(outputs.daily_mix.len(), 1);
    assert_eq!(outputs.daily_mix[0].sequences, vec!["3".to_string()]);
    assert!(approx_eq(outputs.daily_mix[0].volume_m3, 9.0));
}

#[test]
fn test_inverted_window_never_allocates() {
    let outputs = run(
        &[piece("C1", "E1", "1", "VIGA", 5.0)],
        &[window("C1", "E1", "1", "05/01/2024", "01/01/2024")],
        30.0,
    );

    assert!(outputs.daily_mix.is_empty());
    assert_eq!(outputs.pending.len(), 1);
    assert_eq!(outputs.pending[0].reason, PendingReason::DidNotFit);
}

// ==========================================
// 提前终止
// ==========================================

#[test]
fn test_early_exit_no_valid_windows() {
    let outputs = run(
        &[piece("C1", "E1", "1", "VIGA", 5.0)],
        &[window("C1", "E1", "1", "sem data", "")],
        30.0,
    );
    assert!(outputs.daily_mix.is_empty());
    assert_eq!(outputs.pending.len(), 1);
    assert_eq!(outputs.pending[0].reason, PendingReason::NoValidWindows);
}

#[test]
fn test_early_exit_no_positive_volume() {
    let mut missing = piece("C1", "E1", "1", "VIGA", 5.0);
    missing.ct = None;

    let outputs = run(
        &[missing, piece("C1", "E1", "1", "VIGA", 0.0)],
        &[window("C1", "E1", "1", "01/01/2024", "02/01/2024")],
        30.0,
    );
    let reasons: Vec<PendingReason> = outputs.pending.iter().map(|p| p.reason).collect();
    assert_eq!(
        reasons,
        vec![PendingReason::MissingKey, PendingReason::NoPositiveVolume]
    );
    assert!(outputs.daily_mix.is_empty());
}

// ==========================================
// 性质测试
// ==========================================

#[test]
fn test_capacity_conservation_per_day() {
    println!("\n=== 测试：每日分配不超过日产能 ===");
    let (pieces, windows) = mixed_inputs();

    for capacity in [7.5, 20.0, 30.0] {
        let outputs = run(&pieces, &windows, capacity);
        let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for event in &outputs.allocations {
            *per_day.entry(event.date).or_insert(0.0) += event.volume_m3;
        }
        for (day, volume) in per_day {
            assert!(
                volume <= capacity + DRAIN_EPSILON,
                "{} 分配 {} 超过产能 {}",
                day,
                volume,
                capacity
            );
        }
    }
}

#[test]
fn test_volume_conservation_per_sequence() {
    println!("\n=== 测试：体积守恒（已排 + 待处理 = 初始）===");
    let (pieces, windows) = mixed_inputs();
    let outputs = run(&pieces, &windows, 10.0);

    let mut initial: HashMap<(String, String, String), f64> = HashMap::new();
    for lot in &outputs.lots {
        *initial
            .entry((lot.key.ct.clone(), lot.key.etapa.clone(), lot.key.sequence.clone()))
            .or_insert(0.0) += lot.total_volume_m3;
    }

    let mut accounted: HashMap<(String, String, String), f64> = HashMap::new();
    for event in &outputs.allocations {
        *accounted
            .entry((event.ct.clone(), event.etapa.clone(), event.sequence.clone()))
            .or_insert(0.0) += event.volume_m3;
    }
    for item in &outputs.pending {
        if let (Some(ct), Some(etapa), Some(seq), Some(volume)) = (
            &item.ct,
            &item.etapa,
            &item.sequence,
            item.remaining_volume_m3,
        ) {
            *accounted
                .entry((ct.clone(), etapa.clone(), seq.clone()))
                .or_insert(0.0) += volume;
        }
    }

    for (key, volume) in &initial {
        let got = accounted.get(key).copied().unwrap_or(0.0);
        assert!(approx_eq(*volume, got), "{:?}: 初始 {} ≠ 已排+待处理 {}", key, volume, got);
    }

    let total_initial: f64 = initial.values().sum();
    let total_mix: f64 = outputs.daily_mix.iter().map(|r| r.volume_m3).sum();
    assert!(approx_eq(total_initial, total_mix + outputs.total_pending_m3()));
}

#[test]
fn test_allocations_respect_windows() {
    println!("\n=== 测试：分配日期落在序列窗口内 ===");
    let (pieces, windows) = mixed_inputs();
    let outputs = run(&pieces, &windows, 12.0);

    let normalized = Normalizer::new().normalize_windows(&windows);
    for event in &outputs.allocations {
        let window = normalized
            .iter()
            .find(|w| w.ct == event.ct && w.etapa == event.etapa && w.sequence_key == event.sequence)
            .expect("分配的序列必须有窗口");
        let (start, end) = window.bounds().unwrap();
        assert!(
            start <= event.date && event.date <= end,
            "{} 不在 [{}, {}] 内",
            event.date,
            start,
            end
        );
    }
}

#[test]
fn test_strict_sequence_order_per_stream() {
    let (pieces, windows) = mixed_inputs();
    let outputs = run(&pieces, &windows, 8.0);

    // 每个作业流内，事件的序列号单调不减
    let mut last_rank: HashMap<(String, String), u64> = HashMap::new();
    for event in &outputs.allocations {
        let rank: u64 = event.sequence.parse().unwrap();
        let stream = (event.ct.clone(), event.etapa.clone());
        if let Some(previous) = last_rank.get(&stream) {
            assert!(rank >= *previous, "作业流 {:?} 序列倒退: {} → {}", stream, previous, rank);
        }
        last_rank.insert(stream, rank);
    }
}

#[test]
fn test_idempotent_runs() {
    println!("\n=== 测试：相同输入两次运行结果完全一致 ===");
    let (pieces, windows) = mixed_inputs();

    let first = run(&pieces, &windows, 11.0);
    let second = run(&pieces, &windows, 11.0);

    assert_eq!(first.daily_mix, second.daily_mix);
    assert_eq!(first.pending, second.pending);
    assert_eq!(first.allocations, second.allocations);
}

#[test]
fn test_proportional_length() {
    // 单件 10 m，50 m³ → 第一天 30 m³ 对应 6 m
    let outputs = run(
        &[piece("C1", "E1", "1", "VIGA", 50.0)],
        &[window("C1", "E1", "1", "01/01/2024", "02/01/2024")],
        30.0,
    );
    assert!(approx_eq(outputs.daily_mix[0].total_length_m, 6.0));
    assert!(approx_eq(outputs.daily_mix[1].total_length_m, 4.0));
}
