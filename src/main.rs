// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GENAI TOOLS CLI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Uso:
//   genai-tools-cli resume <cargo> <seção> <conteúdo>
//   genai-tools-cli translate [--context <texto>] <texto chinês>
//   genai-tools-cli colloquial [--question <pergunta>] <texto formal>
//   genai-tools-cli reply <print.png> [<print2.png> ...]
//   genai-tools-cli ocr <nota.json> [--url <link>] [--out <dir>]
//   genai-tools-cli chat <registros.json> <pergunta>
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use anyhow::Context;
use genai_tools::export::{ExportKind, FullExport, NoteSummary};
use genai_tools::prelude::*;
use genai_tools::prompts::resume::ResumeSection;
use genai_tools::tools::analytics::{AnalysisReport, EvalRecord};
use genai_tools::tools::ocr::{self, Note, OcrOutcome};
use genai_tools::tools::reply::Screenshot;
use std::io::Write;
use std::path::{Path, PathBuf};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Tenta carregar o arquivo .env de múltiplos locais possíveis
fn load_dotenv() {
    let possible_paths = [PathBuf::from(".env"), PathBuf::from("../.env"), {
        let mut p = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        p.push(".env");
        p
    }];

    for path in &possible_paths {
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => {
                    eprintln!(
                        "✓ Carregado .env de: {:?}",
                        path.canonicalize().unwrap_or(path.clone())
                    );
                    return;
                }
                Err(e) => {
                    eprintln!("⚠ Erro ao carregar {:?}: {}", path, e);
                }
            }
        }
    }

    eprintln!("⚠ Nenhum arquivo .env encontrado. As chaves precisam estar no ambiente.");
}

fn print_usage(program: &str) {
    eprintln!("GenAI Tools CLI v{}", genai_tools::VERSION);
    eprintln!();
    eprintln!("Uso: {} <comando> [argumentos]", program);
    eprintln!();
    eprintln!("Comandos:");
    eprintln!("  resume <cargo> <seção> <conteúdo>               Otimizar seção do currículo (Gemini)");
    eprintln!("  translate [--context <texto>] <texto>           Traduzir texto de interface (Anthropic)");
    eprintln!("  colloquial [--question <pergunta>] <texto>      Reescrever em tom falado (Anthropic)");
    eprintln!("  reply <imagem> [<imagem> ...]                   Sugerir respostas a partir de prints (Anthropic)");
    eprintln!("  ocr <nota.json> [--url <link>] [--out <dir>]    Extrair texto das imagens de uma nota (Doubao)");
    eprintln!("  chat <registros.json> <pergunta>                Relatório e pergunta sobre avaliações (OpenAI)");
    eprintln!();
    eprintln!("Seções do currículo: {}", ResumeSection::ALL.map(|s| s.label()).join(", "));
}

fn banner(title: &str) {
    println!("{}", RULE);
    println!(" {}", title);
    println!("{}", RULE);
    println!();
}

/// Remove `--flag <valor>` dos argumentos e devolve o valor.
fn take_option(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    if pos + 1 >= args.len() {
        args.remove(pos);
        return None;
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Some(value)
}

fn print_fragment(fragment: &str) {
    print!("{}", fragment);
    let _ = std::io::stdout().flush();
}

fn print_variants(variants: &Variants) {
    for (label, text) in variants.labeled() {
        println!("【{}】", label);
        println!("{}", text);
        println!();
    }
    if let Some(warning) = variants.warning() {
        println!("{}", warning);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Carregar .env PRIMEIRO, antes de qualquer coisa
    load_dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args: Vec<String> = std::env::args().collect();
    let program = args.remove(0);

    if args.is_empty() {
        print_usage(&program);
        std::process::exit(1);
    }

    let command = args.remove(0);
    let mut session = Session::from_env();

    let result = match command.as_str() {
        "resume" => run_resume(&mut session, args).await,
        "translate" => run_translate(&mut session, args).await,
        "colloquial" => run_colloquial(&mut session, args).await,
        "reply" => run_reply(&mut session, args).await,
        "ocr" => run_ocr(&mut session, args).await,
        "chat" => run_chat(&mut session, args).await,
        _ => {
            print_usage(&program);
            std::process::exit(1);
        }
    };

    let summary = session.end();
    println!();
    println!("⏱️  {} chamadas, média {:.1}ms", summary.calls, summary.avg_call_ms);

    if let Err(e) = result {
        match e.downcast_ref::<ToolError>() {
            Some(tool_error) => eprintln!("✗ {}", tool_error.user_message()),
            None => eprintln!("✗ Erro: {:#}", e),
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run_resume(session: &mut Session, args: Vec<String>) -> anyhow::Result<()> {
    if args.len() < 3 {
        anyhow::bail!("uso: resume <cargo> <seção> <conteúdo>");
    }
    let section = ResumeSection::parse(&args[1])
        .with_context(|| format!("seção desconhecida: {}", args[1]))?;
    let content = args[2..].join(" ");

    banner(&format!("简历优化 · {} · {}", args[0], section));
    let client = session.client_for(LlmProvider::Gemini)?;
    let result = tools::resume::optimize(session, client.as_ref(), &args[0], section, &content, print_fragment).await?;

    println!();
    println!();
    banner("RESULTADO");
    for (title, section) in result.sections() {
        println!("## {}", title);
        match section {
            TagMatch::Present(text) => println!("{}", text),
            TagMatch::Absent => println!("⚠️ 未找到该部分"),
        }
        println!();
    }
    Ok(())
}

async fn run_translate(session: &mut Session, mut args: Vec<String>) -> anyhow::Result<()> {
    let context = take_option(&mut args, "--context");
    let text = args.join(" ");

    banner("中英文翻译助手");
    let client = session.client_for(LlmProvider::Anthropic)?;
    let variants = tools::translate::translate(session, client.as_ref(), &text, context.as_deref()).await?;
    print_variants(&variants);
    Ok(())
}

async fn run_colloquial(session: &mut Session, mut args: Vec<String>) -> anyhow::Result<()> {
    let question = take_option(&mut args, "--question").unwrap_or_default();
    let text = args.join(" ");

    banner("书面语转口语润色助手");
    let client = session.client_for(LlmProvider::Anthropic)?;
    let variants = tools::colloquial::rewrite(session, client.as_ref(), &question, &text).await?;
    print_variants(&variants);
    Ok(())
}

async fn run_reply(session: &mut Session, args: Vec<String>) -> anyhow::Result<()> {
    if args.is_empty() {
        anyhow::bail!("uso: reply <imagem> [<imagem> ...]");
    }

    banner("回复助手");
    let client = session.client_for(LlmProvider::Anthropic)?;
    for path in &args {
        let bytes = std::fs::read(path).with_context(|| format!("não foi possível ler {}", path))?;
        let screenshot = Screenshot {
            bytes: &bytes,
            file_name: Some(path.as_str()),
        };
        match tools::reply::suggest(session, client.as_ref(), screenshot).await {
            Ok(_) => {}
            Err(e @ ToolError::QuotaExhausted { .. }) => {
                println!("{}", e.user_message());
                break;
            }
            Err(e) => println!("生成回复时出错：{}", e),
        }
    }

    println!("### 所有建议的回复");
    for (i, suggestion) in session.suggestions.suggestions().iter().enumerate() {
        println!("建议 {}: {}", i + 1, suggestion);
    }
    Ok(())
}

async fn run_ocr(session: &mut Session, mut args: Vec<String>) -> anyhow::Result<()> {
    let url = take_option(&mut args, "--url");
    let out_dir = take_option(&mut args, "--out").map(PathBuf::from);
    let note_path = args.first().context("uso: ocr <nota.json> [--url <link>] [--out <dir>]")?;

    let note_id = match url.as_deref() {
        Some(url) if !ocr::is_note_url(url) => anyhow::bail!("❌ 请输入有效的小红书链接"),
        Some(url) => ocr::extract_note_id(&ocr::normalize_note_url(url)),
        None => None,
    };
    if let Some(id) = &note_id {
        println!("📋 检测到笔记ID: {}", id);
    }

    let raw = std::fs::read_to_string(note_path).with_context(|| format!("não foi possível ler {}", note_path))?;
    let note: Note = serde_json::from_str::<Note>(&raw)?.normalized();

    banner("小红书文字提取工具");
    if note.images.is_empty() {
        println!("⚠️ 未找到任何图片");
    }

    let client = session.client_for(LlmProvider::Doubao)?;
    let results = ocr::recognize_note(session, client.as_ref(), &note, |current, total| {
        println!("正在识别图片 {}/{}...", current, total);
    })
    .await;

    for result in &results {
        println!("#### 图片 {} 识别结果", result.index + 1);
        match &result.outcome {
            OcrOutcome::Text(text) => println!("✅ 识别成功\n{}", text),
            OcrOutcome::NoText => println!("⚠️ 未识别到文字内容"),
            OcrOutcome::Failed(error) => println!("⚠️ 未识别到文字内容\n错误信息: {}", error),
        }
        println!();
    }

    let summary = NoteSummary::new(&note, &results);
    if summary.is_empty() {
        println!("⚠️ 所有图片都未能识别到文字内容，且未获取到基本信息");
        return Ok(());
    }
    println!("{}", summary.to_json()?);

    if let Some(dir) = out_dir {
        let full = FullExport::new(&note, &summary)?;
        write_export(&dir, ExportKind::SummaryJson, note_id.as_deref(), &summary.to_json()?)?;
        write_export(&dir, ExportKind::Text, note_id.as_deref(), &summary.to_text())?;
        write_export(&dir, ExportKind::Full, note_id.as_deref(), &full.to_json()?)?;
    }
    Ok(())
}

fn write_export(dir: &Path, kind: ExportKind, note_id: Option<&str>, content: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(kind.file_name(note_id));
    std::fs::write(&path, content).with_context(|| format!("falha ao gravar {:?}", path))?;
    println!("📥 {:?} ({})", path, kind.mime_type());
    Ok(())
}

async fn run_chat(session: &mut Session, args: Vec<String>) -> anyhow::Result<()> {
    if args.len() < 2 {
        anyhow::bail!("uso: chat <registros.json> <pergunta>");
    }
    let raw = std::fs::read_to_string(&args[0]).with_context(|| format!("não foi possível ler {}", args[0]))?;
    let records: Vec<EvalRecord> = serde_json::from_str(&raw)?;
    let report = AnalysisReport::compute(&records);

    banner("数据分析系统 📊");
    println!("{}", report.summary());
    println!();

    banner("💬 与数据对话");
    let question = args[1..].join(" ");
    println!("> {}", question);
    let client = session.client_for(LlmProvider::OpenAi)?;
    tools::analytics::ask(session, client.as_ref(), &report, &question, print_fragment).await?;
    println!();
    Ok(())
}
