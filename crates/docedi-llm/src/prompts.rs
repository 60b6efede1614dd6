//! Prompt templates for the two pipeline stages.

/// Prompt asking the model to identify, clean and structure raw document text.
#[must_use = "prompt is built but not used"]
pub fn build_formatting_prompt(raw_text: &str) -> String {
    format!(
        "You are a text-cleaning assistant. The following is raw OCR text extracted from a scanned business document.

Your job is to:
1. Identify what type of document it is (e.g., Purchase Order, Invoice, Request for Quotation, etc.) and include it in the first line of your response.
2. Correct formatting issues (spacing, line breaks).
3. Remove irrelevant or unreadable artifacts.
4. Retain only meaningful business data.
5. Present the cleaned text in a clear, structured format (with headings like 'Order Summary', 'Invoice Summary', 'Line Items', etc. depending on the document type).

--- BEGIN RAW OCR TEXT ---
{raw_text}
--- END RAW OCR TEXT ---

Return ONLY the cleaned and formatted document with its type clearly stated at the top.
"
    )
}

/// Prompt asking the model to render cleaned text as an EDI document.
#[must_use = "prompt is built but not used"]
pub fn build_edi_prompt(cleaned_text: &str) -> String {
    format!(
        "You are an expert in EDI formatting.

Below is the extracted text from a scanned business document.
1. Identify the correct EDI transaction type:
- 850 = Purchase Order
- 810 = Invoice
- Others as appropriate
2. Generate a valid EDI document of that type.

Only output the EDI document, nothing else.

--- BEGIN DOCUMENT TEXT ---
{cleaned_text}
--- END DOCUMENT TEXT ---
"
    )
}
