//! Texture atlas text format.
//!
//! ```text
//! hero.png
//! size: 256, 128
//! format: RGBA8888
//! filter: Linear, Linear
//! repeat: none
//! head
//!   rotate: false
//!   xy: 2, 2
//!   size: 64, 64
//!   orig: 64, 64
//!   offset: 0, 0
//!   index: -1
//! ```
//!
//! A line without `:` names a page (when no page is open) or a region of the
//! open page; a blank line closes the page. Region tuples after `size` are
//! classified by arity: 4-value tuples are `split` then `pad`, 2-value tuples
//! are `orig` then `offset`.

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Index of an atlas page; renderers map it to their own GPU texture.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub usize);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Format {
    Alpha,
    Intensity,
    LuminanceAlpha,
    Rgb565,
    Rgba4444,
    Rgb888,
    Rgba8888,
}

impl Format {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "Alpha" => Format::Alpha,
            "Intensity" => Format::Intensity,
            "LuminanceAlpha" => Format::LuminanceAlpha,
            "RGB565" => Format::Rgb565,
            "RGBA4444" => Format::Rgba4444,
            "RGB888" => Format::Rgb888,
            "RGBA8888" => Format::Rgba8888,
            _ => return None,
        })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TextureFilter {
    Nearest,
    Linear,
    MipMap,
    MipMapNearestNearest,
    MipMapLinearNearest,
    MipMapNearestLinear,
    MipMapLinearLinear,
}

impl TextureFilter {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "Nearest" => TextureFilter::Nearest,
            "Linear" => TextureFilter::Linear,
            "MipMap" => TextureFilter::MipMap,
            "MipMapNearestNearest" => TextureFilter::MipMapNearestNearest,
            "MipMapLinearNearest" => TextureFilter::MipMapLinearNearest,
            "MipMapNearestLinear" => TextureFilter::MipMapNearestLinear,
            "MipMapLinearLinear" => TextureFilter::MipMapLinearLinear,
            _ => return None,
        })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TextureWrap {
    ClampToEdge,
    Repeat,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtlasPage {
    pub name: String,
    pub format: Format,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub u_wrap: TextureWrap,
    pub v_wrap: TextureWrap,
    /// Pixel size; 0 when the page block omits `size:`.
    pub width: u32,
    pub height: u32,
}

impl AtlasPage {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            format: Format::Rgba8888,
            min_filter: TextureFilter::Nearest,
            mag_filter: TextureFilter::Nearest,
            u_wrap: TextureWrap::ClampToEdge,
            v_wrap: TextureWrap::ClampToEdge,
            width: 0,
            height: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtlasRegion {
    pub name: String,
    /// Index into `Atlas::pages`.
    pub page: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub u: f32,
    pub v: f32,
    pub u2: f32,
    pub v2: f32,
    /// Packed rotated 90 degrees in the page.
    pub rotate: bool,
    pub offset_x: f32,
    pub offset_y: f32,
    pub original_width: u32,
    pub original_height: u32,
    pub index: i32,
    pub splits: Option<[i32; 4]>,
    pub pads: Option<[i32; 4]>,
}

impl AtlasRegion {
    fn new(name: &str, page: usize) -> Self {
        Self {
            name: name.to_string(),
            page,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            u: 0.0,
            v: 0.0,
            u2: 0.0,
            v2: 0.0,
            rotate: false,
            offset_x: 0.0,
            offset_y: 0.0,
            original_width: 0,
            original_height: 0,
            index: -1,
            splits: None,
            pads: None,
        }
    }

    pub fn texture(&self) -> TextureHandle {
        TextureHandle(self.page)
    }

    fn update_uvs(&mut self, page: &AtlasPage) {
        if page.width == 0 || page.height == 0 {
            return;
        }
        let (w, h) = (page.width as f32, page.height as f32);
        let (x, y) = (self.x as f32, self.y as f32);
        let (packed_w, packed_h) = if self.rotate {
            (self.height as f32, self.width as f32)
        } else {
            (self.width as f32, self.height as f32)
        };
        self.u = x / w;
        self.v = y / h;
        self.u2 = (x + packed_w) / w;
        self.v2 = (y + packed_h) / h;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Atlas {
    pub pages: Vec<AtlasPage>,
    pub regions: Vec<AtlasRegion>,
}

impl Atlas {
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let mut atlas = Atlas::default();
        let mut page: Option<usize> = None;
        let mut region: Option<RegionState> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                atlas.finish_region(region.take(), line_no)?;
                page = None;
                continue;
            }

            match (split_entry(line), page) {
                (None, None) => {
                    atlas.pages.push(AtlasPage::new(line));
                    page = Some(atlas.pages.len() - 1);
                }
                (None, Some(p)) => {
                    atlas.finish_region(region.take(), line_no)?;
                    region = Some(RegionState::new(AtlasRegion::new(line, p)));
                }
                (Some(entry), Some(p)) => match region.as_mut() {
                    Some(state) => state.apply(&entry, line_no)?,
                    None => apply_page_entry(&mut atlas.pages[p], &entry, line_no)?,
                },
                (Some(_), None) => {
                    return Err(LoadError::Atlas {
                        line: line_no,
                        reason: format!("entry '{line}' outside of a page"),
                    })
                }
            }
        }
        atlas.finish_region(region.take(), text.lines().count())?;

        log::debug!(
            "atlas parsed: {} pages, {} regions",
            atlas.pages.len(),
            atlas.regions.len()
        );
        Ok(atlas)
    }

    pub fn find_region(&self, name: &str) -> Option<&AtlasRegion> {
        self.regions.iter().find(|r| r.name == name)
    }

    fn finish_region(&mut self, state: Option<RegionState>, line: usize) -> Result<(), LoadError> {
        let Some(state) = state else {
            return Ok(());
        };
        let mut region = state.finish(line)?;
        region.update_uvs(&self.pages[region.page]);
        self.regions.push(region);
        Ok(())
    }
}

/// `key: a, b, c` split into the key and trimmed values.
struct Entry<'a> {
    key: &'a str,
    values: Vec<&'a str>,
}

fn split_entry(line: &str) -> Option<Entry<'_>> {
    let (key, rest) = line.split_once(':')?;
    Some(Entry {
        key: key.trim(),
        values: rest.split(',').map(str::trim).collect(),
    })
}

fn expect_arity(entry: &Entry<'_>, expected: usize, line: usize) -> Result<(), LoadError> {
    if entry.values.len() != expected {
        return Err(LoadError::TupleArity {
            line,
            key: entry.key.to_string(),
            expected,
            actual: entry.values.len(),
        });
    }
    Ok(())
}

fn parse_num<T: std::str::FromStr>(s: &str, key: &str, line: usize) -> Result<T, LoadError> {
    s.parse().map_err(|_| LoadError::Atlas {
        line,
        reason: format!("invalid number '{s}' for '{key}'"),
    })
}

fn parse_pair<T: std::str::FromStr>(entry: &Entry<'_>, line: usize) -> Result<(T, T), LoadError> {
    expect_arity(entry, 2, line)?;
    Ok((
        parse_num(entry.values[0], entry.key, line)?,
        parse_num(entry.values[1], entry.key, line)?,
    ))
}

fn parse_quad(entry: &Entry<'_>, line: usize) -> Result<[i32; 4], LoadError> {
    expect_arity(entry, 4, line)?;
    let mut out = [0; 4];
    for (slot, v) in out.iter_mut().zip(&entry.values) {
        *slot = parse_num(v, entry.key, line)?;
    }
    Ok(out)
}

fn unknown(line: usize, field: &'static str, value: &str) -> LoadError {
    LoadError::UnknownKeyword {
        line,
        field,
        value: value.to_string(),
    }
}

fn apply_page_entry(page: &mut AtlasPage, entry: &Entry<'_>, line: usize) -> Result<(), LoadError> {
    match entry.key {
        "size" => {
            let (w, h) = parse_pair(entry, line)?;
            page.width = w;
            page.height = h;
        }
        "format" => {
            expect_arity(entry, 1, line)?;
            let v = entry.values[0];
            page.format = Format::parse(v).ok_or_else(|| unknown(line, "format", v))?;
        }
        "filter" => {
            expect_arity(entry, 2, line)?;
            let (min, mag) = (entry.values[0], entry.values[1]);
            page.min_filter = TextureFilter::parse(min).ok_or_else(|| unknown(line, "filter", min))?;
            page.mag_filter = TextureFilter::parse(mag).ok_or_else(|| unknown(line, "filter", mag))?;
        }
        "repeat" => {
            expect_arity(entry, 1, line)?;
            let (u, v) = match entry.values[0] {
                "none" => (TextureWrap::ClampToEdge, TextureWrap::ClampToEdge),
                "x" => (TextureWrap::Repeat, TextureWrap::ClampToEdge),
                "y" => (TextureWrap::ClampToEdge, TextureWrap::Repeat),
                "xy" => (TextureWrap::Repeat, TextureWrap::Repeat),
                other => return Err(unknown(line, "repeat", other)),
            };
            page.u_wrap = u;
            page.v_wrap = v;
        }
        other => {
            return Err(LoadError::Atlas {
                line,
                reason: format!("unknown page entry '{other}'"),
            })
        }
    }
    Ok(())
}

/// Region under construction, with the arity-sniffed tuple slots.
struct RegionState {
    region: AtlasRegion,
    quads_seen: usize,
    pairs_seen: usize,
}

impl RegionState {
    fn new(region: AtlasRegion) -> Self {
        Self {
            region,
            quads_seen: 0,
            pairs_seen: 0,
        }
    }

    fn apply(&mut self, entry: &Entry<'_>, line: usize) -> Result<(), LoadError> {
        let r = &mut self.region;
        match entry.key {
            "rotate" => {
                expect_arity(entry, 1, line)?;
                r.rotate = match entry.values[0] {
                    "true" => true,
                    "false" => false,
                    other => return Err(unknown(line, "rotate", other)),
                };
                return Ok(());
            }
            "xy" => {
                let (x, y) = parse_pair(entry, line)?;
                r.x = x;
                r.y = y;
                return Ok(());
            }
            "size" => {
                let (w, h) = parse_pair(entry, line)?;
                r.width = w;
                r.height = h;
                return Ok(());
            }
            "index" => {
                expect_arity(entry, 1, line)?;
                r.index = parse_num(entry.values[0], entry.key, line)?;
                return Ok(());
            }
            "split" | "pad" => expect_arity(entry, 4, line)?,
            "orig" | "offset" => expect_arity(entry, 2, line)?,
            _ => {}
        }

        match entry.values.len() {
            4 => {
                let quad = parse_quad(entry, line)?;
                match self.quads_seen {
                    0 => r.splits = Some(quad),
                    1 => r.pads = Some(quad),
                    _ => {
                        return Err(LoadError::Atlas {
                            line,
                            reason: format!("unexpected 4-value entry '{}'", entry.key),
                        })
                    }
                }
                self.quads_seen += 1;
            }
            2 => {
                match self.pairs_seen {
                    0 => {
                        let (w, h) = parse_pair(entry, line)?;
                        r.original_width = w;
                        r.original_height = h;
                    }
                    1 => {
                        let (x, y) = parse_pair(entry, line)?;
                        r.offset_x = x;
                        r.offset_y = y;
                    }
                    _ => {
                        return Err(LoadError::Atlas {
                            line,
                            reason: format!("unexpected 2-value entry '{}'", entry.key),
                        })
                    }
                }
                self.pairs_seen += 1;
            }
            n => {
                return Err(LoadError::Atlas {
                    line,
                    reason: format!("unexpected entry '{}' with {n} values", entry.key),
                })
            }
        }
        Ok(())
    }

    fn finish(self, line: usize) -> Result<AtlasRegion, LoadError> {
        let mut region = self.region;
        if self.pairs_seen == 0 {
            // No orig: the region is untrimmed.
            region.original_width = region.width;
            region.original_height = region.height;
        }
        if region.width == 0 || region.height == 0 {
            return Err(LoadError::Atlas {
                line,
                reason: format!("region '{}' has no size", region.name),
            });
        }
        Ok(region)
    }
}
