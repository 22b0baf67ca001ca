//! Interactive documentation page.

use crate::openapi::model::ApiDocument;

const SWAGGER_UI_VERSION: &str = "5.17.14";

/// Swagger UI page with the document inlined.
///
/// Assets load from a public CDN; the page itself needs no extra route.
pub fn swagger_ui(document: &ApiDocument) -> Result<String, serde_json::Error> {
    // `</` inside a string literal would close the script element early.
    let spec = serde_json::to_string(document)?.replace("</", "<\\/");
    let title = html_escape(&document.info.title);

    Ok(format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title}</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {{
      window.ui = SwaggerUIBundle({{
        spec: {spec},
        dom_id: "#swagger-ui",
        deepLinking: true,
      }});
    }};
  </script>
</body>
</html>
"##,
        title = title,
        version = SWAGGER_UI_VERSION,
        spec = spec,
    ))
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
