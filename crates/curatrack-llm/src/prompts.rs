//! Prompts for comorbidity and diagnosis suggestions.
//!
//! All answers are requested in Spanish. Each task has a JSON grammar so a
//! local model can be constrained to the expected shape.

/// System prompt for comorbidity suggestions.
pub const COMORBIDITY_SYSTEM_PROMPT: &str = r#"Eres un asistente médico experto. Dado el diagnóstico principal de un paciente, sugerirás posibles comorbilidades que el paciente también pueda tener.

Responde únicamente con un objeto JSON con un arreglo "comorbidities" de cadenas, una comorbilidad por elemento.

Todas tus respuestas deben estar en español."#;

/// System prompt for the diagnosis assistant.
pub const DIAGNOSIS_SYSTEM_PROMPT: &str = r#"Eres una herramienta de asistencia por IA para ayudar a los profesionales de la salud a generar diagnósticos más precisos.

Basándote en los síntomas, el historial médico y otra información relevante proporcionada, sugiere:
- suggestedDiagnoses: posibles diagnósticos, separados por comas
- confidenceLevels: el nivel de confianza para cada diagnóstico
- additionalTests: pruebas adicionales que podrían confirmar el diagnóstico

Todas tus respuestas deben estar en español."#;

/// User prompt for comorbidity suggestions.
pub fn make_comorbidity_prompt(diagnosis: &str) -> String {
    format!(
        r#"Proporciona una lista de comorbilidades relacionadas con el siguiente diagnóstico.

Diagnóstico: {}"#,
        diagnosis
    )
}

/// User prompt for the diagnosis assistant.
pub fn make_diagnosis_prompt(
    symptoms: &str,
    medical_history: &str,
    other_relevant_information: &str,
) -> String {
    format!(
        r#"Síntomas: {}
Historial Médico: {}
Otra Información Relevante: {}

Proporciona la salida en un formato estructurado: un objeto JSON con las claves "suggestedDiagnoses", "confidenceLevels" y "additionalTests", todas de tipo cadena."#,
        symptoms, medical_history, other_relevant_information
    )
}

/// JSON grammar for `{"comorbidities": [string]}`.
pub const COMORBIDITY_GRAMMAR: &str = r#"
root ::= "{" ws "\"comorbidities\"" ws ":" ws list ws "}"
list ::= "[" ws (string (ws "," ws string)*)? ws "]"
string ::= "\"" ([^"\\] | "\\" .)* "\""
ws ::= [ \t\n]*
"#;

/// JSON grammar for the three-string diagnosis answer.
pub const DIAGNOSIS_GRAMMAR: &str = r#"
root ::= "{" ws
    "\"suggestedDiagnoses\"" ws ":" ws string ws "," ws
    "\"confidenceLevels\"" ws ":" ws string ws "," ws
    "\"additionalTests\"" ws ":" ws string ws
"}"
string ::= "\"" ([^"\\] | "\\" .)* "\""
ws ::= [ \t\n]*
"#;

/// Few-shot examples for comorbidity suggestions: (diagnosis, answer).
pub const COMORBIDITY_EXAMPLES: &[(&str, &str)] = &[
    (
        "Diabetes mellitus tipo 2",
        r#"{"comorbidities":["Hipertensión arterial","Dislipidemia","Obesidad","Enfermedad renal crónica"]}"#,
    ),
    (
        "Insuficiencia cardíaca",
        r#"{"comorbidities":["Fibrilación auricular","Hipertensión arterial","Enfermedad renal crónica","Anemia"]}"#,
    ),
];

/// Few-shot examples for the diagnosis assistant: (symptoms, answer).
pub const DIAGNOSIS_EXAMPLES: &[(&str, &str)] = &[(
    "Fiebre de 39 °C, tos productiva y dolor torácico al respirar desde hace tres días",
    r#"{"suggestedDiagnoses":"Neumonía adquirida en la comunidad, Bronquitis aguda, Pleuritis","confidenceLevels":"Alta, Media, Baja","additionalTests":"Radiografía de tórax, Hemograma completo, Proteína C reactiva"}"#,
)];

/// Wrap a system prompt, optional examples and the request in chat tokens.
fn chat_prompt(system: &str, examples: &[(String, &str)], request: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("<|system|>\n");
    prompt.push_str(system);
    prompt.push_str("\n<|end|>\n");

    for (input, output) in examples {
        prompt.push_str("<|user|>\n");
        prompt.push_str(input);
        prompt.push_str("\n<|end|>\n");
        prompt.push_str("<|assistant|>\n");
        prompt.push_str(output);
        prompt.push_str("\n<|end|>\n");
    }

    prompt.push_str("<|user|>\n");
    prompt.push_str(request);
    prompt.push_str("\n<|end|>\n");
    prompt.push_str("<|assistant|>\n");

    prompt
}

/// Complete comorbidity prompt, optionally with few-shot examples.
pub fn build_comorbidity_prompt(diagnosis: &str, include_examples: bool) -> String {
    let examples: Vec<(String, &str)> = if include_examples {
        COMORBIDITY_EXAMPLES
            .iter()
            .map(|(input, output)| (make_comorbidity_prompt(input), *output))
            .collect()
    } else {
        Vec::new()
    };
    chat_prompt(
        COMORBIDITY_SYSTEM_PROMPT,
        &examples,
        &make_comorbidity_prompt(diagnosis),
    )
}

/// Complete diagnosis prompt, optionally with few-shot examples.
pub fn build_diagnosis_prompt(
    symptoms: &str,
    medical_history: &str,
    other_relevant_information: &str,
    include_examples: bool,
) -> String {
    let examples: Vec<(String, &str)> = if include_examples {
        DIAGNOSIS_EXAMPLES
            .iter()
            .map(|(input, output)| (make_diagnosis_prompt(input, "", ""), *output))
            .collect()
    } else {
        Vec::new()
    };
    chat_prompt(
        DIAGNOSIS_SYSTEM_PROMPT,
        &examples,
        &make_diagnosis_prompt(symptoms, medical_history, other_relevant_information),
    )
}
