// ==========================================
// 导入层集成测试
// ==========================================
// 测试目标: CSV 文件 → 列映射 → 原始记录 → 数据质量报告
// ==========================================


use precast_mix::engine::Normalizer;
use precast_mix::importer::{
    columns, DqValidator, ImportError, PlanningImporter, PlanningImporterImpl,
};
use tempfile::TempDir;
use test_helpers::{write_csv, PIECES_HEADER, SEQUENCES_HEADER};

#[tokio::test]
async fn test_import_inputs_from_csv() {
    println!("\n=== 测试：并发导入构件清单与序列表 ===");
    let dir = TempDir::new().unwrap();

    let pieces_path = write_csv(
        dir.path(),
        "pecas.csv",
        PIECES_HEADER,
        &[
            "C1;E1;1 - SETOR A;V1;viga;a;20;40;2;5,5;3,2",
            "C1;E1;2;P1;PILAR;B;30;30;1;4;1,5",
            ";E1;2;P2;PILAR;B;30;30;1;4;1,5",
        ],
    );
    let sequences_path = write_csv(
        dir.path(),
        "sequencias.csv",
        SEQUENCES_HEADER,
        &["C1;E1;1;01/01/2024;05/01/2024", "C1;E1;2;08/01/2024;12/01/2024"],
    );

    let importer = PlanningImporterImpl::default();
    let inputs = importer
        .import_inputs(&pieces_path, &sequences_path)
        .await
        .expect("导入应成功");

    assert!(!inputs.batch_id.is_empty());
    assert_eq!(inputs.pieces.records.len(), 3);
    assert_eq!(inputs.sequences.records.len(), 2);
    assert!(inputs.pieces.mapping.missing_required().is_empty(), "构件清单列应全部映射");
    assert!(inputs.sequences.mapping.missing_required().is_empty(), "序列表必填列应全部映射");

    let first = &inputs.pieces.records[0];
    assert_eq!(first.sequencia.as_deref(), Some("1 - SETOR A"));
    assert_eq!(first.volume_m3.as_deref(), Some("3,2"));
    assert_eq!(first.row_number, 1);

    let pieces = Normalizer::new().normalize_pieces(&inputs.pieces.records);
    assert_eq!(pieces[0].sequence_key, "1");
    assert_eq!(pieces[0].volume_m3, Some(3.2));
    assert_eq!(pieces[0].unit_length_m, Some(5.5));
    println!("✓ 导入与规范化正确");
}

#[tokio::test]
async fn test_synonym_headers_are_mapped() {
    println!("\n=== 测试：同义列名映射 ===");
    let dir = TempDir::new().unwrap();

    let pieces_path = write_csv(
        dir.path(),
        "pecas.csv",
        "Contrato,Fase,Seq Montagem,Peça,Tipo,Armadura,Altura (cm),Largura (cm),Quantidade,Comprimento,Volume",
        &["C9,E1,4,V9,VIGA,A,20,40,1,6,2.5"],
    );

    let table = PlanningImporterImpl::default()
        .import_pieces(&pieces_path)
        .await
        .unwrap();

    assert!(table.mapping.missing_required().is_empty());
    assert_eq!(table.mapping.index_of(columns::CT), Some(0));
    assert_eq!(table.mapping.index_of(columns::VOLUME_M3), Some(10));

    let record = &table.records[0];
    assert_eq!(record.ct.as_deref(), Some("C9"));
    assert_eq!(record.typology.as_deref(), Some("VIGA"));
    assert_eq!(record.height_cm.as_deref(), Some("20"));
}

#[tokio::test]
async fn test_missing_columns_reported_by_validator() {
    println!("\n=== 测试：缺列不阻断导入，由数据质量校验报告 ===");
    let dir = TempDir::new().unwrap();

    let pieces_path = write_csv(
        dir.path(),
        "pecas.csv",
        "CT;ETAPA;SEQUENCIA;VOLUME (M3)",
        &["C1;E1;1;3"],
    );
    let sequences_path = write_csv(
        dir.path(),
        "sequencias.csv",
        SEQUENCES_HEADER,
        &["C1;E1;2;01/01/2024;05/01/2024"],
    );

    let inputs = PlanningImporterImpl::default()
        .import_inputs(&pieces_path, &sequences_path)
        .await
        .expect("缺列不应导致导入失败");

    let normalizer = Normalizer::new();
    let pieces = normalizer.normalize_pieces(&inputs.pieces.records);
    let windows = normalizer.normalize_windows(&inputs.sequences.records);
    let report = DqValidator::new().validate(
        &inputs.pieces.mapping,
        &inputs.sequences.mapping,
        &pieces,
        &windows,
    );

    assert!(!report.is_ok(), "缺少必填列应为错误");
    assert!(report
        .errors()
        .any(|i| i.field.as_deref() == Some(columns::TIPOLOGIA)));
    assert_eq!(
        report.missing_sequence_keys,
        vec![("C1".to_string(), "1".to_string())],
        "序列 1 不在序列表中"
    );
}

#[tokio::test]
async fn test_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let result = PlanningImporterImpl::default()
        .import_pieces(&dir.path().join("nao_existe.csv"))
        .await;
    assert!(matches!(result, Err(ImportError::FileNotFound(_))));
}

#[tokio::test]
async fn test_unsupported_extension_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pecas.txt");
    std::fs::write(&path, "CT;ETAPA\n").unwrap();

    let result = PlanningImporterImpl::default().import_pieces(&path).await;
    assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
}
