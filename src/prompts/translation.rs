//! Prompt do tradutor de textos de interface (chinês → inglês).
//!
//! Contrato: `translation1..3`, sem separador entre nome e índice.

use super::ToolPrompt;
use crate::extract::TagSpec;

pub const TAG_BASE: &str = "translation";
pub const VARIANT_COUNT: usize = 3;

const NO_CONTEXT: &str = "No additional context provided.";

pub fn contract() -> TagSpec {
    TagSpec::indexed(TAG_BASE, "", VARIANT_COUNT)
}

/// Preenche o template com o texto chinês e o contexto opcional.
pub fn build(chinese_text: &str, context: Option<&str>) -> ToolPrompt {
    let context = context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(NO_CONTEXT);
    let [t1, t2, t3] = [1, 2, 3].map(|i| format!("{}{}", TAG_BASE, i));

    let user = format!(
        r#"You are a professional translator specializing in software localization. Your task is to translate Chinese user interface text into three potential English translations. These translations should be suitable for use in software interfaces and reflect natural language usage in English-speaking countries.

Here is the Chinese text to translate:
<chinese_text>
{chinese_text}
</chinese_text>

Additional context information:
{context}

Please provide three different English translations for this text. Each translation should:
1. Accurately convey the meaning of the original Chinese text
2. Be appropriate for use in a software user interface
3. Sound natural and idiomatic to native English speakers

Format your response as follows:
<{t1}>First English translation</{t1}>
<{t2}>Second English translation</{t2}>
<{t3}>Third English translation</{t3}>

There is no need for any note.

Guidelines for high-quality translations:
- Ensure that each translation is distinct and offers a unique way of expressing the concept
- Consider the context of software UI when translating (e.g., conciseness, clarity)
- Avoid literal translations that may sound awkward in English
- Use standard capitalization and punctuation appropriate for UI text

Remember, these translations will be used in a software interface, so they should be clear, concise, and user-friendly. Avoid overly technical language unless it's necessary for accuracy.

Provide your three translations now, each wrapped in the appropriate XML tags as shown above.

Here are some example：
<examples>
<example>
<CHINESE_TEXT>
标准会员
</CHINESE_TEXT>
<ideal_output>
<{t1}>Standard Member</{t1}>
<{t2}>Regular Membership</{t2}>
<{t3}>Basic Member</{t3}>
</ideal_output>
</example>
<example>
<CHINESE_TEXT>
注册
</CHINESE_TEXT>
<ideal_output>
<{t1}>Sign Up</{t1}>
<{t2}>Register</{t2}>
<{t3}>Create Account</{t3}>
</ideal_output>
</example>
"#
    );

    ToolPrompt::tagged(user, contract())
}
