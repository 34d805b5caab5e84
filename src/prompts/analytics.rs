//! Prompt do assistente de análise de dados.
//!
//! A descrição do dataset vai na instrução de sistema; a pergunta do
//! usuário segue sozinha, sem o histórico anterior.

use super::ToolPrompt;

pub fn build(dataset_description: &str, question: &str) -> ToolPrompt {
    ToolPrompt::plain(question.to_string()).with_system(format!(
        "你是一个数据分析助手。以下是数据集的信息：\n{}",
        dataset_description
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_carries_dataset() {
        let prompt = build("总行数：3", "满意率怎么样？");
        assert_eq!(prompt.user, "满意率怎么样？");
        assert!(prompt.system.unwrap().ends_with("总行数：3"));
    }
}
