//! Page objects, their content streams and the page tree root.

use std::borrow::Cow;

use super::writer::PdfWriter;
use crate::encoding::text_string;
use crate::error::{Result, StateError};

/// Handle returned by `Document::add_link`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(pub(crate) usize);

impl LinkId {
    /// 1-based link number.
    pub fn get(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget {
    Uri(String),
    Internal(LinkId),
}

impl From<&str> for LinkTarget {
    fn from(uri: &str) -> Self {
        LinkTarget::Uri(uri.to_string())
    }
}

impl From<String> for LinkTarget {
    fn from(uri: String) -> Self {
        LinkTarget::Uri(uri)
    }
}

impl From<LinkId> for LinkTarget {
    fn from(id: LinkId) -> Self {
        LinkTarget::Internal(id)
    }
}

/// Where an internal link lands: a page number and a user-unit ordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkDest {
    pub page: usize,
    pub y: f64,
}

/// A clickable area in points, measured from the bottom-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLink {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub target: LinkTarget,
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Content stream before compression.
    pub content: Vec<u8>,
    /// Size in points, only when it differs from the document default.
    pub size: Option<(f64, f64)>,
    pub rotation: i32,
    pub links: Vec<PageLink>,
}

/// Everything the page writer needs to know about the document.
pub struct PageTree<'a> {
    pub pages: &'a [Page],
    /// Destinations indexed by link number - 1. `None` until `set_link`.
    pub links: &'a [Option<LinkDest>],
    /// Default page size in points.
    pub default_size: (f64, f64),
    /// Scale factor from user units to points.
    pub k: f64,
    pub alias: Option<&'a str>,
    pub with_alpha: bool,
}

impl PageTree<'_> {
    /// Write every page and its content, then the root as object 1.
    /// Returns the page object ids.
    pub fn write(self, w: &mut PdfWriter) -> Result<Vec<usize>> {
        let count = self.pages.len();
        let first = w.current_id() + 1;
        let ids: Vec<usize> = (0..count).map(|i| first + 2 * i).collect();

        let alias = self.alias.filter(|a| !a.is_empty());
        let total = count.to_string();

        for page in self.pages {
            let annots = self.annotations(page, &ids)?;
            w.new_object(None);
            w.out("<</Type /Page");
            w.out("/Parent 1 0 R");
            if let Some((pw, ph)) = page.size {
                w.out(&format!("/MediaBox [0 0 {:.2} {:.2}]", pw, ph));
            }
            if page.rotation != 0 {
                w.out(&format!("/Rotate {}", page.rotation));
            }
            w.out("/Resources 2 0 R");
            if let Some(annots) = annots {
                w.out_bytes(&annots);
            }
            if self.with_alpha {
                w.out("/Group <</Type /Group /S /Transparency /CS /DeviceRGB>>");
            }
            w.out(&format!("/Contents {} 0 R>>", w.current_id() + 1));
            w.end_object();
            let content = match alias {
                Some(alias) => Cow::Owned(replace_all(&page.content, alias.as_bytes(), total.as_bytes())),
                None => Cow::Borrowed(page.content.as_slice()),
            };
            w.put_stream_object(&content);
        }

        w.new_object(Some(1));
        w.out("<</Type /Pages");
        let kids: String = ids.iter().map(|id| format!("{} 0 R ", id)).collect();
        w.out(&format!("/Kids [{}]", kids));
        w.out(&format!("/Count {}", count));
        w.out(&format!(
            "/MediaBox [0 0 {:.2} {:.2}]",
            self.default_size.0, self.default_size.1
        ));
        w.out(">>");
        w.end_object();
        Ok(ids)
    }

    fn annotations(&self, page: &Page, ids: &[usize]) -> Result<Option<Vec<u8>>> {
        if page.links.is_empty() {
            return Ok(None);
        }
        let mut annots = b"/Annots [".to_vec();
        for link in &page.links {
            annots.extend_from_slice(
                format!(
                    "<</Type /Annot /Subtype /Link /Rect [{:.2} {:.2} {:.2} {:.2}] /Border [0 0 0] ",
                    link.x,
                    link.y,
                    link.x + link.w,
                    link.y - link.h
                )
                .as_bytes(),
            );
            match &link.target {
                LinkTarget::Uri(uri) => {
                    annots.extend_from_slice(b"/A <</S /URI /URI ");
                    annots.extend_from_slice(&text_string(uri));
                    annots.extend_from_slice(b">>>>");
                }
                LinkTarget::Internal(id) => {
                    let dest = self
                        .links
                        .get(id.0.wrapping_sub(1))
                        .copied()
                        .flatten()
                        .filter(|d| d.page >= 1 && d.page <= ids.len())
                        .ok_or(StateError::UnresolvedLink(id.0))?;
                    let h = self.pages[dest.page - 1]
                        .size
                        .map_or(self.default_size.1, |(_, h)| h);
                    annots.extend_from_slice(
                        format!(
                            "/Dest [{} 0 R /XYZ 0 {:.2} null]>>",
                            ids[dest.page - 1],
                            h - dest.y * self.k
                        )
                        .as_bytes(),
                    );
                }
            }
        }
        annots.push(b']');
        Ok(Some(annots))
    }
}

/// Replace every occurrence of `needle` in `haystack`.
fn replace_all(haystack: &[u8], needle: &[u8], with: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(needle) {
            out.extend_from_slice(with);
            i += needle.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FolioError;

    fn page(content: &str) -> Page {
        Page {
            content: content.as_bytes().to_vec(),
            ..Page::default()
        }
    }

    fn render(tree: PageTree<'_>) -> (Vec<usize>, String) {
        let mut w = PdfWriter::new(false);
        let ids = tree.write(&mut w).unwrap();
        (ids, String::from_utf8_lossy(&w.finish(1, 1)).into_owned())
    }

    #[test]
    fn test_page_ids_and_kids() {
        let pages = vec![page("a"), page("b"), page("c")];
        let (ids, text) = render(PageTree {
            pages: &pages,
            links: &[],
            default_size: (595.28, 841.89),
            k: 1.0,
            alias: None,
            with_alpha: false,
        });
        assert_eq!(ids, vec![3, 5, 7]);
        assert!(text.contains("3 0 obj\n<</Type /Page\n/Parent 1 0 R\n/Resources 2 0 R\n/Contents 4 0 R>>\nendobj\n"));
        assert!(text.contains("/Kids [3 0 R 5 0 R 7 0 R ]\n/Count 3\n/MediaBox [0 0 595.28 841.89]\n>>"));
        assert!(!text.contains("/Rotate"));
    }

    #[test]
    fn test_custom_size_rotation_and_group() {
        let pages = vec![Page {
            size: Some((841.89, 595.28)),
            rotation: 90,
            ..page("x")
        }];
        let (_, text) = render(PageTree {
            pages: &pages,
            links: &[],
            default_size: (595.28, 841.89),
            k: 1.0,
            alias: None,
            with_alpha: true,
        });
        assert!(text.contains("/MediaBox [0 0 841.89 595.28]\n/Rotate 90\n/Resources 2 0 R\n/Group <</Type /Group /S /Transparency /CS /DeviceRGB>>\n"));
    }

    #[test]
    fn test_alias_replaced_in_every_page() {
        let pages = vec![page("Page 1/{nb}"), page("Page 2/{nb} {nb}")];
        let (_, text) = render(PageTree {
            pages: &pages,
            links: &[],
            default_size: (100.0, 100.0),
            k: 1.0,
            alias: Some("{nb}"),
            with_alpha: false,
        });
        assert!(text.contains("Page 1/2\n"));
        assert!(text.contains("Page 2/2 2\n"));
        assert_eq!(pages[1].content, b"Page 2/{nb} {nb}");
    }

    #[test]
    fn test_link_annotations() {
        let pages = vec![
            Page {
                links: vec![
                    PageLink { x: 10.0, y: 800.0, w: 50.0, h: 12.0, target: "https://example.com/(a)".into() },
                    PageLink { x: 0.0, y: 700.0, w: 5.0, h: 5.0, target: LinkTarget::Internal(LinkId(1)) },
                ],
                ..page("")
            },
            Page {
                size: Some((300.0, 400.0)),
                ..page("")
            },
        ];
        let links = [Some(LinkDest { page: 2, y: 10.0 })];
        let (_, text) = render(PageTree {
            pages: &pages,
            links: &links,
            default_size: (595.28, 841.89),
            k: 2.0,
            alias: None,
            with_alpha: false,
        });
        let expected = "/Annots [<</Type /Annot /Subtype /Link /Rect [10.00 800.00 60.00 788.00] /Border [0 0 0] /A <</S /URI /URI (https://example.com/\\(a\\))>>>>\
<</Type /Annot /Subtype /Link /Rect [0.00 700.00 5.00 695.00] /Border [0 0 0] /Dest [5 0 R /XYZ 0 380.00 null]>>]\n";
        assert!(text.contains(expected), "{}", text);
    }

    #[test]
    fn test_unset_link_is_an_error() {
        let pages = vec![Page {
            links: vec![PageLink { x: 0.0, y: 0.0, w: 1.0, h: 1.0, target: LinkTarget::Internal(LinkId(1)) }],
            ..page("")
        }];
        let mut w = PdfWriter::new(false);
        let err = PageTree {
            pages: &pages,
            links: &[None],
            default_size: (10.0, 10.0),
            k: 1.0,
            alias: None,
            with_alpha: false,
        }
        .write(&mut w)
        .unwrap_err();
        assert!(matches!(err, FolioError::State(StateError::UnresolvedLink(1))));
    }

    #[test]
    fn test_replace_all() {
        assert_eq!(replace_all(b"{nb}x{nb}", b"{nb}", b"12"), b"12x12");
        assert_eq!(replace_all(b"{n", b"{nb}", b"1"), b"{n");
    }
}
