//! Rendering retrieved chunks as LLM prompt context.

use crate::models::ResultRecord;

/// Default prompt size cap, in characters.
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 8000;

/// Appended when [`compose_prompt`] has to cut the prompt short.
pub const TRUNCATION_MARKER: &str = "\n\n[Katkaistu konteksti]";

/// Render chunks as numbered blocks separated by a blank line:
///
/// ```text
/// [1] (subject | grade_context | content_type)
/// text
/// ```
pub fn format_for_llm(chunks: &[ResultRecord]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "[{}] ({} | {} | {})\n{}",
                i + 1,
                c.subject,
                c.grade_context,
                c.content_type,
                c.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Wrap a user request and a curriculum context block into the assistant
/// prompt.
///
/// Prompts longer than `max_chars` characters are cut at `max_chars` and
/// suffixed with [`TRUNCATION_MARKER`].
pub fn compose_prompt(question: &str, context: &str, max_chars: usize) -> String {
    let prompt = format!(
        "Olet opettajan tekoälyavustaja. Tehtäväsi on luoda opetusmateriaalia alla olevan \
         pyynnön ja opetussuunnitelman (OPS) otteiden pohjalta.\n\n\
         Käytä AINOASTAAN annettua OPS-kontekstia materiaalisi perustana. Älä keksi tai lisää \
         tietoa, jota kontekstissa ei ole.\n\n\
         --- OPS-KONTEKSTI ---\n\
         {context}\n\
         --- KONTEKSTI LOPPUU ---\n\n\
         Käyttäjän pyyntö: \"{question}\"\n\n\
         Laadi opetusmateriaali pyydetyssä muodossa (Otsikkoehdotus, Tavoitteet, Luonnosteksti)."
    );

    if prompt.chars().count() <= max_chars {
        return prompt;
    }

    let mut truncated: String = prompt.chars().take(max_chars).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
