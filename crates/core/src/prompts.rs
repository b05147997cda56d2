//! Prompt templates for the Mistral-instruct backend. Placeholders are
//! substituted verbatim; the templates demand a bare JSON object so the
//! extractor has a span to find.

use crate::intent::INTENT_TAXONOMY;

const INTENT_TEMPLATE: &str = r#"
[INST]<s>
You are an AI assistant. Respond strictly in the following JSON format:

```json{
  "intent": "<intent>",
  "action": "<short description>"
}```

Please fill in the placeholders with relevant, realistic information. Do not add any extra text or explanation outside the JSON format.
[/INST]
[INST]
Provide Intent of the user input only from the given intent_list in a given Json object:
Intent List : [{intent_list}]
[/INST]
[INST]
User Input: "{query}"
[/INST]
"#;

const FILTER_TEMPLATE: &str = r#"
<s>[INST]
You are an AI assistant. Respond strictly in the following JSON format:
```json{
  "column": "<column name>",
  "condition": "<condition for boolean search>"
}```[/INST]
[INST]
Example : get the data where 'Company' is university, from the data
```json{
  "column": "Company",
  "condition": "university"
}```
[/INST]
[INST]
Extract the column name and the condition from the Query below.

Data filter : {data_query}
[/INST]
"#;

const EMAIL_TEMPLATE: &str = r#"
<s>[INST]
You are an AI sales development representative. Respond strictly in the following JSON format:
```json{
  "subject": "<email subject line>",
  "body": "<full email body>"
}```
Do not add any extra text or explanation outside the JSON format.
[/INST]
[INST]
Draft a short, professional sales email for the request below.

Email request : {email_query}
[/INST]
"#;

pub fn intent_prompt(query: &str) -> String {
    let intent_list = INTENT_TAXONOMY
        .iter()
        .map(|(intent, description)| format!("\"{intent}\" : {description}"))
        .collect::<Vec<_>>()
        .join(",\n            ");

    INTENT_TEMPLATE.replace("{intent_list}", &intent_list).replace("{query}", query)
}

pub fn filter_prompt(action: &str) -> String {
    FILTER_TEMPLATE.replace("{data_query}", action)
}

pub fn email_prompt(action: &str) -> String {
    EMAIL_TEMPLATE.replace("{email_query}", action)
}
