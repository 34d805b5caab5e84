//! Prompt do reescritor de texto formal para fala coloquial.
//!
//! Contrato: `colloquial_text_1..3`, índice separado por `_`.

use super::ToolPrompt;
use crate::extract::TagSpec;

pub const TAG_BASE: &str = "colloquial_text";
pub const TAG_SEPARATOR: &str = "_";
pub const VARIANT_COUNT: usize = 3;

pub fn contract() -> TagSpec {
    TagSpec::indexed(TAG_BASE, TAG_SEPARATOR, VARIANT_COUNT)
}

/// Preenche o template com a pergunta do cliente e a resposta formal.
pub fn build(question: &str, formal_text: &str) -> ToolPrompt {
    let [t1, t2, t3] = [1, 2, 3].map(|i| format!("{}{}{}", TAG_BASE, TAG_SEPARATOR, i));

    let user = format!(
        r#"你的任务是将一段书面化的中文文本转换成3个口语化的中文逐字口语转录文本，作为候选。这个过程需要你将正式的书面语言转化为更自然、更随意的口头表达方式。

客户的问题是：
<question>
{question}
</question>

以下是需要你转换的书面化中文文本作为问题的回答：

<formal_text>
{formal_text}
</formal_text>

请按照以下步骤进行转换：

1. 仔细阅读原文，理解其主要内容和语气。

2. 将书面化的表达替换成更口语化的表达。例如：
   - 将"因此"改为"所以"或"那么"
   - 将"然而"改为"不过"或"但是"
   - 将"即使"改为"就算"或"哪怕"

3. 添加一些口语中常见的语气词，如"嗯"、"那个"、"就是"等。不要有"呃""额"。

4. 适当增加重复、停顿和自我纠正，以模仿真实对话中的特点。

5. 可以加入一些口语化的语法"错误"，如省略主语、谓语或宾语，使用不完整的句子结构等。

6. 将一些较长的句子拆分成更短的句子，使其更符合口语表达习惯。

7. 使用更简单、更直接的词语替换书面语中的复杂词汇。

8.字数跟输入的文本保持差不多。

请将转换后的口语化文本放在<{base}>标签内。确保转换后的文本听起来自然、随意，就像是有人在进行即兴演讲或日常对话。

例如：
<{t1}>
第一个候选文本
</{t1}>
<{t2}>
第二个候选文本
</{t2}>
<{t3}>
第三个候选文本
</{t3}>

记住，转换的关键是保持原文的基本含义，同时使其听起来更像是口头表达。不要过度修改原文的核心信息，但要让它听起来更自然、更随意。

现在，请开始转换工作，将给定的书面化文本转换为口语化的表达。"#,
        base = TAG_BASE,
    );

    ToolPrompt::tagged(user, contract())
}
