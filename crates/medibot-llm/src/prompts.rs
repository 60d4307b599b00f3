//! The four fixed prompts used by the dialogue engine.
//!
//! The two structured prompts (extraction, revision) instruct the model to
//! end its reasoning with a single JSON-style dictionary; that tail object
//! is what [`crate::extraction`] parses.

/// System prompt for intent classification (is this a medical question?).
pub const INTENT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Identify if a user is asking for information about a medical object or not. If so respond only with 'yes', or 'no' if not. If you are not sure don't answer anything else.";

/// System prompt for answer generation over retrieved product documents.
pub const GENERATION_SYSTEM_PROMPT: &str = "You are a helpful assistant. Use the provided context to answer the user's question and answer in Bahasa.";

/// Fixed satisfaction question appended after every generated answer.
pub const SATISFACTION_PROMPT: &str = "Apakah kamu puas dengan jawaban ini?";

/// System prompt for fact extraction.
///
/// Enumerates the twelve fact labels with their meanings and walks the model
/// through one worked example so the final line is a lone dictionary.
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You will be given a prompt from the user containing questions about drug facts or a medical related object.
Your job is to identify facts that can help determine the object the user is referring to, your job is not to answer the question.
The types of information and their explanations are:
1. Drug Name: The name of the drug as listed on the site (eg: Emturnas Drops 15 ml).
2. Instructions: Instructions on when and how the drug should be used (eg: After meals).
3. Dosage: Information on the recommended dosage or amount of consumption, can be based on age or condition.
4. Side Effects: Side effects that may arise after taking the drug.
5. Category: Legal category of the drug, it must only include: Over-the-Counter Drugs, Limited Over-the-Counter Drugs, Prescription Drugs, Consumer Products and nothing else since it's a categorical fact.
6. General Indications: General uses of the drug, namely to treat certain symptoms or diseases.
7. Shape and size: The shape and size of the product packaging (eg: Box, Bottle @ 15 ml).
8. Composition: The content or active substance in the drug.
9. Contraindications: Situations or conditions that prevent the drug from being used (eg: severe liver dysfunction).
10. Manufacturer: The name of the company or factory that produces the drug.
11. Warning: Special warnings before using this drug, such as prohibitions on use in certain conditions, how to handle the drug, and doctor prescription requirements.
12. Description: A brief explanation of the drug in general, often including the purpose and how the drug works.

Example:
Apa efek samping, aturan pakai, dan siapa yang membuat obat untuk meredakan demam yang bernama panadol.

Provide the same analysis steps as the steps below:
1. Identify the types of information desired by the user. If there is no information desired by the user then keep it empty. In this case, because the user asks for side effects, instructions, and who makes it, the desired types are [Side Effects, Instructions, Manufacturer].
2. Identify the information provided by the user that can help identify the object the user is referring to. In this case [medicine to relieve fever, medicine called panadol].
3. Determine the type of each provided piece of information by looking at the explanation of the 12 types. If a piece of information doesn't fit the 12 types then don't list it. In this case [to relieve fever: General Indications, panadol: Drug Name].
4. Create a dictionary that contains the desired fact types and the provided facts with their types. Do not include notes or additions to the output, it must remain a dictionary.

Output: {"Desired fact": ["Side Effects", "Instructions", "Manufacturer"], "Fact provided": {"General Indications": "untuk meredakan demam", "Drug Name": "panadol"}}
Final output format: JSON-style dictionary as above.
Do not answer the user's question, just identify the information."#;

/// System prompt for fact revision.
///
/// The model decides per mentioned fact whether the *type* was wrong
/// (retype under another label) or the *value* was wrong (replace it), and
/// returns the fully merged corrected map, never a diff.
pub const REVISION_SYSTEM_PROMPT: &str = r#"You will be given a dictionary and a prompt from the user containing a revision about drug facts or a medical related object.
Your job is to revise the facts that can help determine the object the user is referring to, your job is not to answer the question.
The types of information and their explanations are:
1. Drug Name: The name of the drug as listed on the site (eg: Emturnas Drops 15 ml).
2. Instructions: Instructions on when and how the drug should be used (eg: After meals).
3. Dosage: Information on the recommended dosage or amount of consumption, can be based on age or condition.
4. Side Effects: Side effects that may arise after taking the drug.
5. Category: Legal category of the drug, it must only include: Over-the-Counter Drugs, Limited Over-the-Counter Drugs, Prescription Drugs, Consumer Products and nothing else since it's a categorical fact.
6. General Indications: General uses of the drug, namely to treat certain symptoms or diseases.
7. Shape and size: The shape and size of the product packaging (eg: Box, Bottle @ 15 ml).
8. Composition: The content or active substance in the drug.
9. Contraindications: Situations or conditions that prevent the drug from being used (eg: severe liver dysfunction).
10. Manufacturer: The name of the company or factory that produces the drug.
11. Warning: Special warnings before using this drug, such as prohibitions on use in certain conditions, how to handle the drug, and doctor prescription requirements.
12. Description: A brief explanation of the drug in general, often including the purpose and how the drug works.

Example:
{"Fact provided": {"General Indications": "untuk hypersensitivitas", "Drug Name": "panadol"}}
Mengobati hypersensitivitas bukan kegunaan dari obatnya tapi obatnya bukan untuk orang yang hypersensitivitas dan panadol itu bukan namanya tapi namanya paracetamol.

Provide the same analysis steps as the steps below:
1. Identify the fact types that need to be revised; each type has to be inside the dictionary. In this case ['General Indications', 'Drug Name'].
2. For each of those types, decide whether the thing that needs to change is the type itself or the fact value. In this case ['General Indications': type, 'Drug Name': fact].
3. Apply the changes and return the full corrected dictionary, not only the changed entries. In this case since General Indications needs to become Contraindications and panadol needs to become paracetamol: {"Fact provided": {"Contraindications": "tidak untuk hypersensitivitas", "Drug Name": "paracetamol"}}.
4. Do not include notes or additions to the output, it must remain a dictionary.

Output: {"Fact provided": {"Contraindications": "tidak untuk hypersensitivitas", "Drug Name": "paracetamol"}}
Final output format: JSON-style dictionary as above.
Do not answer the user's question, just revise the information."#;

/// User message for the intent-classification prompt.
pub fn make_intent_prompt(question: &str) -> String {
    format!("Query: {question}")
}

/// User message for the revision prompt: current facts plus revision text.
pub fn make_revision_prompt(current_facts_json: &str, revision: &str) -> String {
    format!("{{\"Fact provided\": {current_facts_json}}}\n{revision}")
}

/// User message for the generation prompt.
pub fn make_generation_prompt(context: &str, question: &str) -> String {
    format!("Context:\n{context}\n\nQuestion: {question}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_prompt_lists_all_labels() {
        for label in [
            "Drug Name",
            "Instructions",
            "Dosage",
            "Side Effects",
            "Category",
            "General Indications",
            "Shape and size",
            "Composition",
            "Contraindications",
            "Manufacturer",
            "Warning",
            "Description",
        ] {
            assert!(
                EXTRACTION_SYSTEM_PROMPT.contains(label),
                "missing label {label}"
            );
            assert!(
                REVISION_SYSTEM_PROMPT.contains(label),
                "missing label {label}"
            );
        }
    }

    #[test]
    fn revision_prompt_embeds_current_facts() {
        let user = make_revision_prompt(r#"{"Drug Name": "panadol"}"#, "namanya paracetamol");
        assert!(user.starts_with(r#"{"Fact provided": {"Drug Name": "panadol"}}"#));
        assert!(user.ends_with("namanya paracetamol"));
    }

    #[test]
    fn generation_prompt_carries_context_and_question() {
        let user = make_generation_prompt("Drug Name: Panadol", "efek samping?");
        assert!(user.contains("Context:\nDrug Name: Panadol"));
        assert!(user.contains("Question: efek samping?"));
    }
}
