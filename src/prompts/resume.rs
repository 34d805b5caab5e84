//! Prompt do otimizador de currículo.
//!
//! Contrato: três tags de nome fixo, cada uma esperada uma vez.

use std::fmt;

use super::ToolPrompt;
use crate::extract::TagSpec;

pub const TAG_ANALYSIS: &str = "analysis";
pub const TAG_OPTIMIZATION_IDEAS: &str = "optimization_ideas";
pub const TAG_OPTIMIZED_CONTENT: &str = "optimized_content";

/// Seção do currículo que o usuário está otimizando.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeSection {
    BasicInfo,
    Education,
    WorkExperience,
    Projects,
    Skills,
    SelfSummary,
}

impl ResumeSection {
    /// Todas as seções, na ordem do seletor.
    pub const ALL: [ResumeSection; 6] = [
        Self::BasicInfo,
        Self::Education,
        Self::WorkExperience,
        Self::Projects,
        Self::Skills,
        Self::SelfSummary,
    ];

    /// Rótulo exibido e inserido no prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BasicInfo => "基本信息",
            Self::Education => "教育经历",
            Self::WorkExperience => "工作经历",
            Self::Projects => "项目经历",
            Self::Skills => "专业能力",
            Self::SelfSummary => "自我总结",
        }
    }

    /// Aceita o rótulo chinês ou um apelido ASCII.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|s| s.label() == value).or(match value.to_lowercase().as_str() {
            "basic" | "info" => Some(Self::BasicInfo),
            "education" => Some(Self::Education),
            "work" | "experience" => Some(Self::WorkExperience),
            "projects" | "project" => Some(Self::Projects),
            "skills" => Some(Self::Skills),
            "summary" => Some(Self::SelfSummary),
            _ => None,
        })
    }
}

impl fmt::Display for ResumeSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Contrato de tags da resposta.
pub fn contract() -> TagSpec {
    TagSpec::named([TAG_ANALYSIS, TAG_OPTIMIZATION_IDEAS, TAG_OPTIMIZED_CONTENT])
}

/// Preenche o template com cargo, seção e conteúdo original.
pub fn build(job_title: &str, section: ResumeSection, resume_content: &str) -> ToolPrompt {
    let user = format!(
        r#"你是一位专业的简历优化顾问，擅长根据特定职位需求来优化求职者的简历内容。你的任务是根据给定的职位和简历部分，对简历内容进行优化和改进。请仔细阅读以下信息，并按照指示进行操作。

职位名称：
<job_title>
{job_title}
</job_title>

简历部分：
<resume_section>
{section}
</resume_section>

原始简历内容：
<resume_content>
{resume_content}
</resume_content>

请按照以下步骤优化简历内容：

1. 分析职位和简历：
   - 仔细分析职位名称和简历部分，确定这个职位可能需要的关键技能和经验。
   - 审查原始简历内容，找出与职位相关的重要信息。

2. 优化思路：
   - 列出与职位最相关的经验和技能。
   - 思考原文本中需要优化的地方，并展开进行说明。
   - 考虑如何编造具体的数字和成就来量化成果，增加简历的说服力。
   - 检查并纠正任何语法或拼写错误。
   - 考虑使用STAR法则（情境、任务、行动、结果）来优化简历内容。

3. 修改简历：
   - 根据上述思考和优化点对简历内容进行修改。
   - 使用简洁、专业的语言，避免冗长或不必要的内容。
   - 加入与职位相关的关键词。
   - 使用第三人称来表述，并且输出的内容跟原文本段落格式和风格和字数一致。

请将你的回答按以下格式输出：

<{analysis}>
在这里写下你对职位要求和原始简历内容的分析。
</{analysis}>

<{ideas}>
在这里列出你的优化思路和建议。
</{ideas}>

<{optimized}>
在这里写下优化后的简历内容。
</{optimized}>"#,
        job_title = job_title,
        section = section.label(),
        resume_content = resume_content,
        analysis = TAG_ANALYSIS,
        ideas = TAG_OPTIMIZATION_IDEAS,
        optimized = TAG_OPTIMIZED_CONTENT,
    );

    ToolPrompt::tagged(user, contract())
}
