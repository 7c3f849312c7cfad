//! Server-rendered views.
//!
//! Templates live under `templates/` and are compiled into the binary by
//! askama. Every page extends `layouts/boilerplate.html`.

use askama::Template;

use crate::error::Error;
use crate::listing::Listing;
use crate::response::Response;

/// `GET /listings`
#[derive(Debug, Template)]
#[template(path = "listings/index.html")]
pub struct IndexView {
    pub listings: Vec<Listing>,
}

/// `GET /listings/new`
#[derive(Debug, Template)]
#[template(path = "listings/new.html")]
pub struct NewView;

/// `GET /listings/{id}`. `listing` is `None` when the id is unknown.
#[derive(Debug, Template)]
#[template(path = "listings/show.html")]
pub struct ShowView {
    pub listing: Option<Listing>,
}

/// `GET /listings/{id}/edit`. `listing` is `None` when the id is unknown.
#[derive(Debug, Template)]
#[template(path = "listings/edit.html")]
pub struct EditView {
    pub listing: Option<Listing>,
}

/// Renders `view` into a `200 text/html` response.
pub fn render(view: &impl Template) -> Result<Response, Error> {
    Ok(Response::html(view.render()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ListingId;

    fn listing(title: &str) -> Listing {
        Listing {
            id: ListingId::new(),
            title: title.to_owned(),
            description: "Quiet & green".to_owned(),
            image: String::new(),
            price: Some(1500.0),
            location: "Manali".to_owned(),
            country: "India".to_owned(),
        }
    }

    #[test]
    fn index_links_every_listing() {
        let a = listing("Cabin");
        let b = listing("Loft");
        let html = IndexView { listings: vec![a.clone(), b.clone()] }.render().unwrap();
        assert!(html.contains(&format!("/listings/{}", a.id)));
        assert!(html.contains(&format!("/listings/{}", b.id)));
    }

    #[test]
    fn show_escapes_fields() {
        let html = ShowView { listing: Some(listing("<b>Cabin</b>")) }.render().unwrap();
        assert!(html.contains("&lt;b&gt;Cabin&lt;/b&gt;"));
        assert!(html.contains("Quiet &amp; green"));
        assert!(html.contains("1500"));
    }

    #[test]
    fn show_tolerates_missing_listing() {
        let html = ShowView { listing: None }.render().unwrap();
        assert!(html.contains("This listing does not exist"));
    }

    #[test]
    fn edit_form_overrides_to_put() {
        let l = listing("Cabin");
        let html = EditView { listing: Some(l.clone()) }.render().unwrap();
        assert!(html.contains(&format!("/listings/{}?_method=PUT", l.id)));
        assert!(html.contains(r#"name="listing[title]""#));
    }

    #[test]
    fn edit_form_keeps_decimal_price() {
        let l = Listing { price: Some(1200.5), ..listing("Cabin") };
        let html = EditView { listing: Some(l) }.render().unwrap();
        assert!(html.contains(r#"step="any" value="1200.5""#));
    }

    #[test]
    fn render_wraps_html() {
        let res = render(&NewView).unwrap();
        assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
        assert!(res.text_body().contains(r#"action="/listings""#));
    }
}
