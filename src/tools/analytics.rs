// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ANÁLISE DE AVALIAÇÕES + CHAT DE DADOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Estatísticas sobre registros de avaliação de um assistente (nota humana,
// SQU manual x máquina, grupo de amostra, nota da máquina, itens recuperados)
// e um chat em streaming que recebe o resumo do dataset como instrução de
// sistema.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};

use super::{require, stream_timed, ToolError};
use crate::llm::LlmClient;
use crate::prompts::analytics;
use crate::session::Session;
use crate::types::{ChatMessage, ChatRequest, Role};

/// Colunas do dataset, na ordem original.
pub const COLUMNS: [&str; 6] = ["评分", "人工SQU", "机器SQU", "问题标签", "机器打分", "召回条数"];

pub const RANDOM_SAMPLE_LABEL: &str = "随机样本";
pub const NEGATIVE_SAMPLE_LABEL: &str = "负样本";

/// Uma linha avaliada.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalRecord {
    /// Nota humana: 优秀, 合格 ou 较差.
    #[serde(rename = "评分", default)]
    pub rating: Option<String>,
    #[serde(rename = "人工SQU", default)]
    pub manual_squ: Option<String>,
    #[serde(rename = "机器SQU", default)]
    pub machine_squ: Option<String>,
    /// Grupo da amostra: 随机样本 ou 负样本.
    #[serde(rename = "问题标签", default)]
    pub sample_label: Option<String>,
    #[serde(rename = "机器打分", default)]
    pub machine_score: Option<f64>,
    #[serde(rename = "召回条数", default)]
    pub recall_count: Option<u32>,
}

impl EvalRecord {
    fn is_satisfied(&self) -> bool {
        self.rating
            .as_deref()
            .map(|r| r.contains("优秀") || r.contains("合格"))
            .unwrap_or(false)
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Percentual de satisfeitos (优秀 ou 合格) entre as linhas com nota.
pub fn overall_satisfaction(records: &[EvalRecord]) -> f64 {
    let rated: Vec<&EvalRecord> = records.iter().filter(|r| r.rating.is_some()).collect();
    satisfaction(&rated)
}

fn satisfaction(rows: &[&EvalRecord]) -> f64 {
    percent(rows.iter().filter(|r| r.is_satisfied()).count(), rows.len())
}

/// Acerto do modelo SQU: o valor manual contido no valor da máquina.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquAccuracy {
    pub manual_correct: usize,
    pub manual_incorrect: usize,
    pub accuracy: f64,
    pub total_rows: usize,
    pub valid_rows: usize,
}

pub fn squ_accuracy(records: &[EvalRecord]) -> SquAccuracy {
    let valid: Vec<(&str, &str)> = records
        .iter()
        .filter_map(|r| Some((r.manual_squ.as_deref()?, r.machine_squ.as_deref()?)))
        .collect();
    let manual_correct = valid.iter().filter(|(manual, machine)| machine.contains(manual)).count();

    SquAccuracy {
        manual_correct,
        manual_incorrect: valid.len() - manual_correct,
        accuracy: percent(manual_correct, valid.len()),
        total_rows: records.len(),
        valid_rows: valid.len(),
    }
}

/// Estatísticas de um grupo de amostras.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleStats {
    pub total: usize,
    pub excellent: usize,
    pub qualified: usize,
    pub poor: usize,
    pub satisfaction: f64,
    pub avg_score: f64,
}

impl SampleStats {
    fn from_rows(rows: &[&EvalRecord]) -> Self {
        let count = |needle: &str| {
            rows.iter()
                .filter(|r| r.rating.as_deref().map(|x| x.contains(needle)).unwrap_or(false))
                .count()
        };
        let excellent = count("优秀");
        let qualified = count("合格");
        let poor = count("较差");

        let scores: Vec<f64> = rows.iter().filter_map(|r| r.machine_score).collect();
        let avg_score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };

        Self {
            total: rows.len(),
            excellent,
            qualified,
            poor,
            satisfaction: percent(excellent + qualified, excellent + qualified + poor),
            avg_score,
        }
    }
}

/// Grupos aleatório e negativo.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelStats {
    pub random: SampleStats,
    pub negative: SampleStats,
}

/// Só entram linhas com grupo, nota humana e nota da máquina.
pub fn model_stats(records: &[EvalRecord]) -> ModelStats {
    ModelStats {
        random: SampleStats::from_rows(&sample_group(records, RANDOM_SAMPLE_LABEL)),
        negative: SampleStats::from_rows(&sample_group(records, NEGATIVE_SAMPLE_LABEL)),
    }
}

fn sample_group<'a>(records: &'a [EvalRecord], label: &str) -> Vec<&'a EvalRecord> {
    records
        .iter()
        .filter(|r| r.rating.is_some() && r.machine_score.is_some())
        .filter(|r| r.sample_label.as_deref() == Some(label))
        .collect()
}

/// Estatísticas de recuperação da base de conhecimento.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecallStats {
    pub avg_recall: f64,
    pub recall_ratio: f64,
    pub total_with_recall: usize,
    pub total_no_recall: usize,
    pub recall_1_3_satisfaction: f64,
    pub recall_4_7_satisfaction: f64,
    pub recall_8_10_satisfaction: f64,
    pub no_recall_satisfaction: f64,
    pub total_recall_1_3: usize,
    pub total_recall_4_7: usize,
    pub total_recall_8_10: usize,
}

pub fn recall_stats(records: &[EvalRecord]) -> RecallStats {
    let counts: Vec<u32> = records.iter().filter_map(|r| r.recall_count).collect();
    let avg_recall = if counts.is_empty() {
        0.0
    } else {
        counts.iter().map(|c| *c as f64).sum::<f64>() / counts.len() as f64
    };
    let total_with_recall = counts.iter().filter(|c| **c > 0).count();
    let total_no_recall = counts.len() - total_with_recall;

    // Faixas consideram só linhas com nota humana
    let bucket = |low: u32, high: u32| {
        records
            .iter()
            .filter(|r| r.rating.is_some())
            .filter(|r| r.recall_count.map(|c| (low..=high).contains(&c)).unwrap_or(false))
            .collect::<Vec<_>>()
    };
    let b1_3 = bucket(1, 3);
    let b4_7 = bucket(4, 7);
    let b8_10 = bucket(8, 10);
    let none = bucket(0, 0);

    RecallStats {
        avg_recall,
        recall_ratio: percent(total_with_recall, counts.len()),
        total_with_recall,
        total_no_recall,
        recall_1_3_satisfaction: satisfaction(&b1_3),
        recall_4_7_satisfaction: satisfaction(&b4_7),
        recall_8_10_satisfaction: satisfaction(&b8_10),
        no_recall_satisfaction: satisfaction(&none),
        total_recall_1_3: b1_3.len(),
        total_recall_4_7: b4_7.len(),
        total_recall_8_10: b8_10.len(),
    }
}

/// Relatório completo de um dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub total_rows: usize,
    pub overall_satisfaction: f64,
    pub squ: SquAccuracy,
    pub model: ModelStats,
    pub recall: RecallStats,
}

impl AnalysisReport {
    pub fn compute(records: &[EvalRecord]) -> Self {
        let report = Self {
            total_rows: records.len(),
            overall_satisfaction: overall_satisfaction(records),
            squ: squ_accuracy(records),
            model: model_stats(records),
            recall: recall_stats(records),
        };
        log::info!(
            "📊 {} linhas, satisfação {:.2}%, SQU {:.2}%",
            report.total_rows,
            report.overall_satisfaction,
            report.squ.accuracy
        );
        report
    }

    /// Resumo em texto, pronto para copiar.
    pub fn summary(&self) -> String {
        let squ = &self.squ;
        let r = &self.model.random;
        let n = &self.model.negative;
        let rc = &self.recall;

        format!(
            "一、SQU有效性判断模型，准确率 {:.2}%：\n\
             总数据量：{} 组 有效数据量：{} 组（排除空值后）\n\
             人工标注：准确 {} 组、不准确 {} 组\n\
             \n\
             二、打分模型能力，共完成{}条有效且反馈满意度：\n\
             随机样本（机器打分>6分）：共{}组， 优秀{}组、 合格{}组、 较差{}组， 满意度{:.2}%， 机器均分{:.2}分\n\
             \n\
             负样本（机器打分<6分）：共{}组， 优秀{}组、 合格{}组、 较差{}组， 满意度{:.2}%， 机器均分{:.2}分\n\
             \n\
             三、知识库召回分析：\n\
             平均召回条数：{:.2}条，有召回占比（召回内容大于等于1）：{:.2}% ({}/{})\n\
             召回1~3条知识：{}组，满意度{:.2}%\n\
             召回4~7条知识：{}组，满意度{:.2}%\n\
             召回8~10条知识：{}组，满意度{:.2}%\n\
             无召回样本：{}组，满意度{:.2}%",
            squ.accuracy,
            squ.total_rows,
            squ.valid_rows,
            squ.manual_correct,
            squ.manual_incorrect,
            squ.total_rows,
            r.total,
            r.excellent,
            r.qualified,
            r.poor,
            r.satisfaction,
            r.avg_score,
            n.total,
            n.excellent,
            n.qualified,
            n.poor,
            n.satisfaction,
            n.avg_score,
            rc.avg_recall,
            rc.recall_ratio,
            rc.total_with_recall,
            rc.total_no_recall,
            rc.total_recall_1_3,
            rc.recall_1_3_satisfaction,
            rc.total_recall_4_7,
            rc.recall_4_7_satisfaction,
            rc.total_recall_8_10,
            rc.recall_8_10_satisfaction,
            rc.total_no_recall,
            rc.no_recall_satisfaction,
        )
    }

    /// Descrição do dataset injetada na instrução de sistema do chat.
    pub fn dataset_description(&self) -> String {
        format!(
            "数据集包含以下列：{}\n总行数：{}\n\n数据统计信息：\n- 总体满意率: {:.2}%\n- SQU模型准确率: {:.2}%\n- 平均召回条数: {:.2}",
            COLUMNS.join(", "),
            self.total_rows,
            self.overall_satisfaction,
            self.squ.accuracy,
            self.recall.avg_recall
        )
    }
}

/// Responde a uma pergunta sobre o dataset.
///
/// A pergunta e a resposta entram no histórico da sessão, mas o modelo
/// recebe só a instrução de sistema e a pergunta atual.
pub async fn ask<F>(
    session: &mut Session,
    client: &dyn LlmClient,
    report: &AnalysisReport,
    question: &str,
    on_fragment: F,
) -> Result<String, ToolError>
where
    F: FnMut(&str),
{
    let question = require("问题", question)?;
    session.chat.push(Role::User, question);

    let prompt = analytics::build(&report.dataset_description(), question);
    let mut request = ChatRequest::new(ChatMessage::user(prompt.user));
    if let Some(system) = prompt.system {
        request = request.with_system(system);
    }

    let answer = stream_timed(session, client, &request, on_fragment).await?;
    session.chat.push(Role::Assistant, answer.clone());
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rating: Option<&str>, label: Option<&str>, score: Option<f64>, recall: Option<u32>) -> EvalRecord {
        EvalRecord {
            rating: rating.map(String::from),
            sample_label: label.map(String::from),
            machine_score: score,
            recall_count: recall,
            ..Default::default()
        }
    }

    fn dataset() -> Vec<EvalRecord> {
        vec![
            record(Some("优秀"), Some("随机样本"), Some(8.0), Some(2)),
            record(Some("合格"), Some("随机样本"), Some(7.0), Some(5)),
            record(Some("较差"), Some("负样本"), Some(3.0), Some(0)),
            record(Some("合格"), Some("负样本"), Some(5.0), Some(9)),
            record(None, Some("随机样本"), Some(9.0), Some(1)),
        ]
    }

    #[test]
    fn test_overall_satisfaction_ignores_unrated() {
        assert_eq!(overall_satisfaction(&dataset()), 75.0);
        assert_eq!(overall_satisfaction(&[]), 0.0);
    }

    #[test]
    fn test_squ_accuracy_contains() {
        let records = vec![
            EvalRecord {
                manual_squ: Some("退货".into()),
                machine_squ: Some("退货,退款".into()),
                ..Default::default()
            },
            EvalRecord {
                manual_squ: Some("物流".into()),
                machine_squ: Some("退款".into()),
                ..Default::default()
            },
            EvalRecord {
                manual_squ: Some("物流".into()),
                ..Default::default()
            },
        ];
        let acc = squ_accuracy(&records);
        assert_eq!(acc.manual_correct, 1);
        assert_eq!(acc.manual_incorrect, 1);
        assert_eq!(acc.accuracy, 50.0);
        assert_eq!(acc.total_rows, 3);
        assert_eq!(acc.valid_rows, 2);
    }

    #[test]
    fn test_model_stats_groups() {
        let stats = model_stats(&dataset());
        assert_eq!(stats.random.total, 2);
        assert_eq!(stats.random.satisfaction, 100.0);
        assert_eq!(stats.random.avg_score, 7.5);
        assert_eq!(stats.negative.poor, 1);
        assert_eq!(stats.negative.satisfaction, 50.0);
    }

    #[test]
    fn test_recall_buckets() {
        let stats = recall_stats(&dataset());
        assert_eq!(stats.avg_recall, 17.0 / 5.0);
        assert_eq!(stats.total_with_recall, 4);
        assert_eq!(stats.total_no_recall, 1);
        assert_eq!(stats.recall_ratio, 80.0);
        // A linha sem nota não entra nas faixas
        assert_eq!(stats.total_recall_1_3, 1);
        assert_eq!(stats.total_recall_4_7, 1);
        assert_eq!(stats.total_recall_8_10, 1);
        assert_eq!(stats.no_recall_satisfaction, 0.0);
    }

    #[test]
    fn test_summary_and_description() {
        let report = AnalysisReport::compute(&dataset());
        let summary = report.summary();
        assert!(summary.starts_with("一、SQU有效性判断模型"));
        assert!(summary.contains("随机样本（机器打分>6分）：共2组"));
        assert!(summary.contains("无召回样本：1组，满意度0.00%"));

        let description = report.dataset_description();
        assert!(description.contains("总行数：5"));
        assert!(description.contains("- 总体满意率: 75.00%"));
    }

    #[test]
    fn test_record_from_json_columns() {
        let json = r#"{"评分":"优秀","机器打分":8.5,"召回条数":3}"#;
        let record: EvalRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.rating.as_deref(), Some("优秀"));
        assert_eq!(record.recall_count, Some(3));
        assert!(record.manual_squ.is_none());
    }
}
