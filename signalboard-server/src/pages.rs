//! Server-rendered HTML. Pure glue over the current collection state;
//! no template engine, just string building with escaping.

use signalboard::{Signal, Site};

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

pub fn index() -> String {
    layout(
        "Signalboard",
        "<h1>Signalboard</h1>\n<ul>\n\
         <li><a href=\"/register\">Register</a></li>\n\
         <li><a href=\"/signals\">Signals</a></li>\n\
         <li><a href=\"/sites\">Site directory</a></li>\n\
         <li><a href=\"/submit-site\">Submit a site</a></li>\n\
         </ul>",
    )
}

pub fn register_form() -> String {
    layout(
        "Register",
        "<h1>Register</h1>\n\
         <form method=\"post\" action=\"/register\">\n\
         <label>Username <input name=\"username\"></label>\n\
         <label>Password <input name=\"password\" type=\"password\"></label>\n\
         <button type=\"submit\">Register</button>\n\
         </form>",
    )
}

pub fn submit_site_form() -> String {
    layout(
        "Submit a site",
        "<h1>Submit a site</h1>\n\
         <form method=\"post\" action=\"/submit-site\">\n\
         <label>Name <input name=\"site_name\"></label>\n\
         <label>URL <input name=\"site_url\"></label>\n\
         <label>Description <input name=\"site_description\"></label>\n\
         <button type=\"submit\">Submit</button>\n\
         </form>",
    )
}

pub fn signals_page(signals: &[Signal]) -> String {
    let mut body = String::from("<h1>Signals</h1>\n");
    if signals.is_empty() {
        body.push_str("<p>No signals yet.</p>");
    } else {
        body.push_str("<ul>\n");
        for signal in signals {
            body.push_str(&format!(
                "<li><strong>{}</strong> — {} <em>({})</em></li>\n",
                escape(&signal.title),
                escape(&signal.body),
                signal.created_at.to_rfc3339(),
            ));
        }
        body.push_str("</ul>");
    }
    layout("Signals", &body)
}

pub fn sites_page(sites: &[Site]) -> String {
    let mut body = String::from("<h1>Site directory</h1>\n");
    if sites.is_empty() {
        body.push_str("<p>No sites yet.</p>");
    } else {
        body.push_str("<ul>\n");
        for site in sites {
            body.push_str(&format!(
                "<li><a href=\"{url}\">{name}</a> — {desc} \
                 (<span id=\"likes-{id}\">{likes}</span> likes, \
                 <a href=\"/like-site/{id}\">like</a>)</li>\n",
                url = escape(&site.url),
                name = escape(&site.name),
                desc = escape(&site.description),
                id = site.id,
                likes = site.likes,
            ));
        }
        body.push_str("</ul>");
    }
    layout("Site directory", &body)
}

pub fn admin_broadcast() -> String {
    layout(
        "Broadcast",
        "<h1>Broadcast</h1>\n\
         <form method=\"post\">\n\
         <label>Message <textarea name=\"message\"></textarea></label>\n\
         <button type=\"submit\">Send</button>\n\
         </form>",
    )
}

pub fn admin_ads() -> String {
    layout("Ads", "<h1>Ads</h1>\n<p>No ad slots configured.</p>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_handles_markup() {
        assert_eq!(escape("<b>&\"</b>"), "&lt;b&gt;&amp;&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_sites_page_escapes_user_content() {
        let site: Site = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "<script>alert(1)</script>",
            "url": "https://example.com",
            "description": "desc",
            "likes": 0,
            "submitted_at": "2026-01-15T10:30:00Z",
        }))
        .unwrap();
        let sites = vec![site];
        let html = sites_page(&sites);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
