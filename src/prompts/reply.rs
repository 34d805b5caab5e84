//! Prompt do sugeridor de respostas de chat.
//!
//! Vai como parte de texto logo depois da imagem do print. Contrato: a tag
//! `suggestion` repetida, no máximo três ocorrências consideradas.

use super::ToolPrompt;
use crate::extract::TagSpec;

pub const TAG: &str = "suggestion";
pub const SUGGESTION_LIMIT: usize = 3;

/// Temperatura usada nas sugestões.
pub const TEMPERATURE: f32 = 0.5;
/// Limite de tokens de saída.
pub const MAX_TOKENS: u32 = 1024;

pub fn contract() -> TagSpec {
    TagSpec::repeated(TAG, SUGGESTION_LIMIT)
}

pub fn build() -> ToolPrompt {
    let user = format!(
        r#"你正在帮助某人在与暗恋对象的对话中构思回复。你将获得聊天记录截图，生成三个简短的一句话回复。以下是你的任务：

1. 分析对话，你需要关注：
- 对话的语气和风格；
- 正在讨论的任何特定主题或主题；
- 对方发送的最后一条消息；

2. 根据您的分析，生成三个简短的一句话回复建议：
- 保持对话的当前语气和风格；
- 如果没有很好的话题延展方向，就开启一个新话题；
- 适合与暗恋对象交流（即友好、可能调情，但不要过于直接）；
- 如果对方没有给你emoji表情，那么输出也不要有emoji表情；

3 在三个 <{tag}>  </{tag}> 标签内提供您的回复建议。

请在三个<{tag}></{tag}>标签内提供回复建议。不要包含任何解释或评论。"#,
        tag = TAG
    );

    ToolPrompt::tagged(user, contract())
}
