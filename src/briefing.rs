//! Briefing prompt construction and generation.
//!
//! The prompt embeds a fixed consultant persona, the corpus (or an explicit
//! no-news placeholder) and the three-section layout the model must follow.
//! The layout is only requested; the model output is not validated.

use crate::api::AskAsync;
use tracing::{error, info, instrument};

pub const SECTION_REGULATORY: &str = "1. Alertas Regulatórios Urgentes";
pub const SECTION_MANAGEMENT: &str = "2. Gestão e Finanças do Salão";
pub const SECTION_TRENDS: &str = "3. Tendências e Oportunidades de Mercado";

/// Answer the model is told to give when there is nothing to analyse.
pub const NO_UPDATES: &str = "Nenhuma atualização relevante encontrada.";

/// Prefix of the report returned in place of a briefing when generation fails.
pub const FAILURE_PREFIX: &str = "Falha ao gerar o informe estratégico";

const NO_CONTENT_PLACEHOLDER: &str =
    "(Nenhuma notícia relevante foi encontrada hoje nas fontes monitoradas.)";

/// Build the full prompt for a corpus, or for a run that found nothing.
pub fn build_prompt(corpus: Option<&str>) -> String {
    let corpus = corpus.map(str::trim).filter(|c| !c.is_empty());
    let news = corpus.unwrap_or(NO_CONTENT_PLACEHOLDER);
    let empty_rule = if corpus.is_none() {
        format!(
            "Não há notícias para analisar nesta execução. Em cada tópico, escreva apenas \"{NO_UPDATES}\", com impacto Baixo e sem plano de ação."
        )
    } else {
        format!("Se um tópico não tiver informação, escreva \"{NO_UPDATES}\".")
    };

    format!(
        r#"**Análise Estratégica para Donos de Salão de Beleza**

**Contexto:** Você é um consultor de negócios sênior especializado no setor de beleza. Analise o compilado de notícias abaixo, coletado de diversas fontes, e traduza as informações em insights práticos e acionáveis para o dono de um salão.

**Notícias para Análise:**
---
{news}
---

**Sua Tarefa:** Estruture sua resposta EXATAMENTE nos três tópicos a seguir, usando os títulos exatamente como escritos. {empty_rule}

Para cada tópico, inclua:
- **Resumo:** o que mudou e quem é afetado.
- **Impacto:** Baixo, Médio ou Alto.
- **Plano de Ação:** passos numerados (1., 2., 3., ...).

**{SECTION_REGULATORY} 🚨**
   - Novas normas da ANVISA, da vigilância sanitária ou leis que exijam ação imediata para evitar multas.

**{SECTION_MANAGEMENT} 💰**
   - Impostos, leis trabalhistas, pisos salariais ou custos que impactem o lucro.

**{SECTION_TRENDS} 💡**
   - Novas tendências, produtos ou técnicas que possam gerar mais receita e como o salão pode ser pioneiro.
"#
    )
}

/// Ask the model for a briefing over `corpus`.
///
/// Never fails: when the call fails the returned text is a failure report
/// starting with [`FAILURE_PREFIX`] and naming the cause.
#[instrument(level = "info", skip_all, fields(has_corpus = corpus.is_some()))]
pub async fn generate_briefing<A>(asker: &A, corpus: Option<&str>) -> String
where
    A: AskAsync + Sync,
{
    let prompt = build_prompt(corpus);
    info!(prompt_chars = prompt.chars().count(), "Sending corpus for analysis");

    match asker.ask(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, "Briefing generation failed");
            format!("{FAILURE_PREFIX}: {e}")
        }
    }
}
