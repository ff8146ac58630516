/// Builds the scoring prompt sent to the oracle
///
/// The prompt is a pure function of its inputs so identical pages always
/// produce identical requests.
pub fn build_prompt(text: &str, url: &str, keywords: &[String]) -> String {
    format!(
        "Given the following text and the url it came from, rate if it contains content \
         relevant to these keywords: {}.\n\
         Return ONLY a single float number between 1 and 10, where 10 is most relevant and \
         1 is least relevant. NOT ALL THE TEXT HAS TO BE RELEVANT TO THE KEYWORDS, only some\n\
         Text: {}\n\
         URL: {}",
        keywords.join(", "),
        text,
        url
    )
}
