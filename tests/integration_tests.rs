//! # Testes de Integração
//!
//! Valida o fluxo completo de cada ferramenta contra o `MockLlmClient`:
//! - Extrator: cenários de contrato (nome fixo, indexado, lacuna, repetido, lixo)
//! - Ferramentas: template → chamada → extração → sessão
//! - OCR: reconhecimento por imagem → resumo → exportação

use genai_tools::export::{ExportKind, FullExport, NoteSummary};
use genai_tools::prelude::*;
use genai_tools::prompts::resume::ResumeSection;
use genai_tools::tools::analytics::{AnalysisReport, EvalRecord};
use genai_tools::tools::ocr::{Note, OcrOutcome};
use genai_tools::tools::reply::Screenshot;
use genai_tools::tools::PARSE_FAILURE_MESSAGE;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

fn session() -> Session {
    Session::new(Credentials::new(), ToolsConfig::default())
}

fn texts(segments: &[Segment]) -> Vec<&str> {
    segments.iter().map(|s| s.text.as_str()).collect()
}

// ============================================================================
// EXTRATOR: cenários de contrato
// ============================================================================

#[test]
fn test_fixed_names_all_present() {
    let raw = "<analysis>A</analysis><optimization_ideas>B</optimization_ideas><optimized_content>C</optimized_content>";
    let response = TaggedResponse::parse(raw, genai_tools::prompts::resume::contract());

    assert_eq!(response.get("analysis"), TagMatch::Present("A"));
    assert_eq!(response.get("optimization_ideas"), TagMatch::Present("B"));
    assert_eq!(response.get("optimized_content"), TagMatch::Present("C"));
    assert!(response.is_complete());
    assert_eq!(response.raw_text(), raw);
}

#[test]
fn test_indexed_all_present() {
    let raw = "<translation1>X</translation1><translation2>Y</translation2><translation3>Z</translation3>";
    let segments = extract(raw, &TagSpec::indexed("translation", "", 3));
    assert_eq!(texts(&segments), vec!["X", "Y", "Z"]);
}

#[test]
fn test_indexed_gap_renumbers_positions() {
    let raw = "<translation1>X</translation1><translation3>Z</translation3>";
    let variants = Variants::parse(raw, TagSpec::indexed("translation", "", 3));

    assert_eq!(
        variants.labeled(),
        vec![("版本 1".to_string(), "X"), ("版本 2".to_string(), "Z")]
    );
    assert!(variants.warning().is_some());
}

#[test]
fn test_repeated_capped_at_limit() {
    let raw = "<suggestion>Hi there</suggestion><suggestion>How's it going</suggestion>";
    let segments = extract(raw, &TagSpec::repeated("suggestion", 3));
    assert_eq!(texts(&segments), vec!["Hi there", "How's it going"]);

    let many = "<suggestion>1</suggestion><suggestion>2</suggestion><suggestion>3</suggestion><suggestion>4</suggestion>";
    let segments = extract(many, &TagSpec::repeated("suggestion", 3));
    assert_eq!(texts(&segments), vec!["1", "2", "3"]);
}

#[test]
fn test_garbage_yields_nothing_for_every_contract() {
    let raw = "no tags here";
    let specs = [
        genai_tools::prompts::resume::contract(),
        TagSpec::indexed("translation", "", 3),
        TagSpec::indexed("colloquial_text", "_", 3),
        TagSpec::repeated("suggestion", 3),
    ];
    for spec in &specs {
        assert!(extract(raw, spec).is_empty(), "{:?}", spec);
    }
}

#[test]
fn test_extraction_is_idempotent_and_trimmed() {
    let raw = "<colloquial_text_1>\n  嗯，那个  \n</colloquial_text_1>";
    let spec = TagSpec::indexed("colloquial_text", "_", 3);
    let first = extract(raw, &spec);
    let second = extract(raw, &spec);

    assert_eq!(first, second);
    assert_eq!(first[0].text, "嗯，那个");
    assert_eq!(first[0].text, first[0].text.trim());
}

// ============================================================================
// FERRAMENTAS: template → chamada → extração
// ============================================================================

#[tokio::test]
async fn test_translate_flow() {
    let mut session = session();
    let client = MockLlmClient::with_text(
        "<translation1>Sign Up</translation1>\n<translation2>Register</translation2>\n<translation3>Create Account</translation3>",
    );

    let variants = tools::translate::translate(&mut session, &client, "注册", Some("按钮"))
        .await
        .unwrap();

    assert_eq!(texts(variants.segments()), vec!["Sign Up", "Register", "Create Account"]);
    assert!(variants.warning().is_none());

    let request = &client.requests()[0];
    assert_eq!(request.max_tokens, 1000);
    assert!(request.messages[0].text().contains("<chinese_text>\n注册\n</chinese_text>"));
    assert_eq!(session.timings.call_times.len(), 1);
}

#[tokio::test]
async fn test_translate_rejects_blank_input_without_calling() {
    let mut session = session();
    let client = MockLlmClient::new();

    let result = tools::translate::translate(&mut session, &client, "   ", None).await;

    assert!(matches!(result, Err(ToolError::EmptyInput(_))));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_colloquial_no_versions_reports_failure() {
    let mut session = session();
    let client = MockLlmClient::with_text("抱歉，我无法完成。");

    let variants = tools::colloquial::rewrite(&mut session, &client, "", "因此您需要提交申请。")
        .await
        .unwrap();

    assert!(variants.is_empty());
    assert_eq!(variants.warning().as_deref(), Some(PARSE_FAILURE_MESSAGE));
}

#[tokio::test]
async fn test_upstream_error_is_surfaced() {
    let mut session = session();
    let client = MockLlmClient::failing(LlmError::AuthError("invalid x-api-key".into()));

    let err = tools::translate::translate(&mut session, &client, "会员", None)
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::Upstream(LlmError::AuthError(_))));
    assert!(err.user_message().contains("invalid x-api-key"));
    assert_eq!(session.timings.failures, 1);
}

#[tokio::test]
async fn test_resume_streams_then_parses() {
    let mut session = session();
    let client = MockLlmClient::new().with_provider(LlmProvider::Gemini);
    client.push_reply(MockReply::Fragments(vec![
        "<analysis>需要".into(),
        "数据能力</analysis><optimization_ideas>量化".into(),
        "成果</optimization_ideas>".into(),
    ]));

    let mut fragments = 0;
    let result = tools::resume::optimize(
        &mut session,
        &client,
        "数据分析师",
        ResumeSection::WorkExperience,
        "负责报表",
        |_| fragments += 1,
    )
    .await
    .unwrap();

    assert_eq!(fragments, 3);
    assert_eq!(result.analysis(), TagMatch::Present("需要数据能力"));
    assert_eq!(result.optimization_ideas(), TagMatch::Present("量化成果"));
    assert_eq!(result.optimized_content(), TagMatch::Absent);
}

#[tokio::test]
async fn test_resume_mid_stream_error_yields_no_result() {
    let mut session = session();
    let client = MockLlmClient::new();
    client.push_reply(MockReply::BrokenStream(
        vec!["<analysis>parcial".into()],
        LlmError::NetworkError("connection reset".into()),
    ));

    let result = tools::resume::optimize(
        &mut session,
        &client,
        "产品经理",
        ResumeSection::Projects,
        "做过App",
        |_| {},
    )
    .await;

    assert!(matches!(result, Err(ToolError::Upstream(LlmError::NetworkError(_)))));
}

#[tokio::test]
async fn test_reply_accumulates_until_cap() {
    let mut config = ToolsConfig::default();
    config.suggestion_cap = 2;
    let mut session = Session::new(Credentials::new(), config);
    let client = MockLlmClient::with_text(
        "<suggestion>在干嘛呀</suggestion>\n<suggestion>周末有空吗</suggestion>\n<suggestion>哈哈真的假的</suggestion>\n<suggestion>多余</suggestion>",
    );
    let screenshot = Screenshot {
        bytes: PNG,
        file_name: Some("chat.png"),
    };

    let first = tools::reply::suggest(&mut session, &client, screenshot).await.unwrap();
    assert_eq!(texts(&first), vec!["在干嘛呀", "周末有空吗", "哈哈真的假的"]);

    tools::reply::suggest(&mut session, &client, screenshot).await.unwrap();
    assert_eq!(session.suggestions.suggestions().len(), 6);

    let err = tools::reply::suggest(&mut session, &client, screenshot).await.unwrap_err();
    assert!(matches!(err, ToolError::QuotaExhausted { used: 2, cap: 2 }));
    assert_eq!(client.call_count(), 2);

    // Imagem antes do texto, temperatura 0.5
    let request = &client.requests()[0];
    assert!(matches!(request.messages[0].parts[0], ContentPart::InlineImage { .. }));
    assert!(matches!(request.messages[0].parts[1], ContentPart::Text(_)));
    assert_eq!(request.temperature, Some(0.5));
    assert_eq!(request.max_tokens, 1024);

    session.suggestions.clear();
    assert!(session.suggestions.can_generate());
}

#[tokio::test]
async fn test_reply_rejects_bad_image_before_call() {
    let mut session = session();
    let client = MockLlmClient::new();
    let screenshot = Screenshot {
        bytes: b"not an image",
        file_name: Some("notes.txt"),
    };

    let err = tools::reply::suggest(&mut session, &client, screenshot).await.unwrap_err();

    assert!(matches!(err, ToolError::Image(_)));
    assert_eq!(client.call_count(), 0);
    assert_eq!(session.suggestions.generations(), 0);
}

#[test]
fn test_session_requires_credentials() {
    let session = session();
    for provider in [LlmProvider::Anthropic, LlmProvider::Gemini, LlmProvider::OpenAi] {
        assert!(matches!(
            session.client_for(provider).err(),
            Some(ToolError::MissingCredential { .. })
        ));
    }
}

// ============================================================================
// OCR: imagens → resumo → exportação
// ============================================================================

#[tokio::test]
async fn test_ocr_flow_keeps_going_after_failure() {
    let mut session = session();
    let client = MockLlmClient::new().with_provider(LlmProvider::Doubao);
    client.push_reply(MockReply::Text("  周末去公园\n带上野餐垫 ".into()));
    client.push_reply(MockReply::Text("无文字".into()));
    client.push_reply(MockReply::Error(LlmError::RateLimitError));
    client.push_reply(MockReply::Text("门票 50 元".into()));

    let note = Note {
        title: "周末计划".into(),
        description: "四张图".into(),
        images: vec![
            "@//img/1.jpg".into(),
            "//img/2.jpg".into(),
            "img/3.jpg".into(),
            "https://img/4.jpg".into(),
        ],
    }
    .normalized();

    let mut progress = Vec::new();
    let results = tools::ocr::recognize_note(&mut session, &client, &note, |current, total| {
        progress.push((current, total))
    })
    .await;

    assert_eq!(progress, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
    assert_eq!(results[0].outcome, OcrOutcome::Text("周末去公园\n带上野餐垫".into()));
    assert_eq!(results[1].outcome, OcrOutcome::NoText);
    assert!(matches!(results[2].outcome, OcrOutcome::Failed(_)));
    assert_eq!(results[3].outcome.text(), Some("门票 50 元"));

    let request = &client.requests()[0];
    assert_eq!(request.messages[0].parts[0], ContentPart::ImageUrl("http://img/1.jpg".into()));

    let summary = NoteSummary::new(&note, &results);
    assert_eq!(
        summary.image_texts.iter().map(|(label, _)| label.as_str()).collect::<Vec<_>>(),
        vec!["图片1", "图片4"]
    );

    let json = summary.to_json().unwrap();
    assert!(json.contains("\"标题\": \"周末计划\""));

    let full = FullExport::new(&note, &summary).unwrap();
    assert_eq!(full.ocr_texts.len(), 2);
    assert_eq!(ExportKind::Full.file_name(None), "xiaohongshu_完整_content.json");
}

// ============================================================================
// ANÁLISE: relatório + chat
// ============================================================================

#[tokio::test]
async fn test_analytics_chat_sends_system_and_question_only() {
    let records: Vec<EvalRecord> = serde_json::from_str(
        r#"[
            {"评分":"优秀","人工SQU":"退货","机器SQU":"退货","问题标签":"随机样本","机器打分":8,"召回条数":2},
            {"评分":"较差","人工SQU":"物流","机器SQU":"退款","问题标签":"负样本","机器打分":3,"召回条数":0}
        ]"#,
    )
    .unwrap();
    let report = AnalysisReport::compute(&records);
    assert_eq!(report.overall_satisfaction, 50.0);
    assert_eq!(report.squ.accuracy, 50.0);

    let mut session = session();
    let client = MockLlmClient::new().with_provider(LlmProvider::OpenAi);
    client.push_reply(MockReply::Fragments(vec!["满意率".into(), "是50%".into()]));
    client.push_reply(MockReply::Text("第二个回答".into()));

    let answer = tools::analytics::ask(&mut session, &client, &report, "满意率怎么样？", |_| {})
        .await
        .unwrap();
    assert_eq!(answer, "满意率是50%");

    tools::analytics::ask(&mut session, &client, &report, "召回呢？", |_| {})
        .await
        .unwrap();

    // Histórico para exibição; o modelo só recebe a pergunta atual
    assert_eq!(session.chat.len(), 4);
    let second = &client.requests()[1];
    assert_eq!(second.messages.len(), 1);
    assert_eq!(second.messages[0].text(), "召回呢？");
    assert!(second
        .system
        .as_deref()
        .unwrap()
        .starts_with("你是一个数据分析助手。以下是数据集的信息：\n"));

    let summary = session.end();
    assert_eq!(summary.chat_turns, 4);
    assert_eq!(summary.calls, 2);
}
