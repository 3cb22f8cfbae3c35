// Accounting-analyst prompt used for every analysis request

use std::path::Path;

use crate::error::{FinancialAnalysisError, Result};
use crate::llm::types::ChatMessage;

pub const REFUSAL_MESSAGE: &str =
    "Sinto muito, mas não fui treinado para responder perguntas deste assunto.";

pub const USER_PROMPT_PREFIX: &str = "Por favor, analise os seguintes dados:";

pub const SYSTEM_PROMPT_ANALYST: &str = "Você é um analista contábil e financeiro e fará a análise de balancetes e DRE's,
realizará análises horizontais e verticais, cálculos de indicadores contábeis como liquidez, rentabilidade, endividamento e lucratividade.
Além disso, analisa a coerência dos valores de estoque, clientes e fornecedores em relação ao faturamento, e fornece insights precisos sobre a saúde financeira da empresa,
aponte as divergências das contas relevantes que não constam nos relatórios como vendas, custos, água, energia, telefone, aluguel, pró-labore, e outros.
Quando o relatório constar vários períodos sendo meses ou anos, gere automaticamente o gráfico de Receita, Custos, Despesas e Resultado.
Todas as vezes que você calcular um indicador, demonstre a memória de cálculo, isto é muito importante para o usuário.
Pontos de Alerta, quando o Caixa Credor quer dizer que o caixa está estourado, deve-se enfatizar o risco de omissão de receitas e complemente.
Quando constar Adiantamento para Futuro Aumento de Capital, Lançamentos no passivo nessa conta devem ser monitorados e destacados para evitar irregularidades contábeis, enfatize bem os riscos de fazer este lançamento se ele não for de fato real.
Caso o usuário insira informações ou assuntos que não são coerentes com as instruções acima, desconsidere e responda com a mensagem: 'Sinto muito, mas não fui treinado para responder perguntas deste assunto.'";

/// A named system instruction plus the phrase that introduces the user data.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    pub name: String,
    pub system_instruction: String,
    pub user_prefix: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::accounting_analyst()
    }
}

impl PromptTemplate {
    pub fn accounting_analyst() -> Self {
        Self {
            name: "accounting-analyst".to_string(),
            system_instruction: SYSTEM_PROMPT_ANALYST.to_string(),
            user_prefix: USER_PROMPT_PREFIX.to_string(),
        }
    }

    /// Loads a replacement system instruction from a text file, keeping the
    /// default user prefix. The template is named after the file stem.
    pub fn from_file(path: &Path) -> Result<Self> {
        let system_instruction = std::fs::read_to_string(path)?;
        if system_instruction.trim().is_empty() {
            return Err(FinancialAnalysisError::InvalidPrompt(format!(
                "{} is empty",
                path.display()
            )));
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("custom")
            .to_string();

        Ok(Self {
            name,
            system_instruction,
            user_prefix: USER_PROMPT_PREFIX.to_string(),
        })
    }

    /// The two messages of an analysis request: system, then user.
    pub fn messages(&self, content: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_instruction.clone()),
            ChatMessage::user(format!("{} {}", self.user_prefix, content)),
        ]
    }
}
