//! The book: pages, the page selection smoother, and the frame clock.

use crate::animation::{FrameTime, PageAnimator, PageState};
use crate::catalog::{build_pages, page_label};
use crate::config::BookConfig;
use crate::error::{Result, StorybookError};
use crate::geometry::{build_page_mesh, Mesh};
use crate::material::{PageMaterials, TextureProvider};
use crate::selection::{PageSignal, PageSmoother, StepEvent};
use crate::skeleton::Skeleton;
use crate::types::{BoneRotation, PageSpec, PageTransform};
use serde::Serialize;
use std::f32::consts::FRAC_PI_2;

/// One page of the book.
#[derive(Debug, Clone)]
pub struct Page {
    number: usize,
    spec: PageSpec,
    skeleton: Skeleton,
    animator: PageAnimator,
    materials: PageMaterials,
}

impl Page {
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn spec(&self) -> &PageSpec {
        &self.spec
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn animator(&self) -> &PageAnimator {
        &self.animator
    }

    pub fn materials(&self) -> &PageMaterials {
        &self.materials
    }
}

/// Pose of one page, as handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagePose {
    pub number: usize,
    pub is_open: bool,
    pub depth_offset: f32,
    pub emissive_intensity: f32,
    pub bones: Vec<BoneRotation>,
}

/// Pose of the whole book at one clock reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookPose {
    pub clock_ms: f64,
    pub requested: usize,
    pub delayed: usize,
    pub pages: Vec<PagePose>,
}

/// An animated book.
#[derive(Debug)]
pub struct Book {
    config: BookConfig,
    mesh: Mesh,
    pages: Vec<Page>,
    smoother: PageSmoother,
    clock_ms: f64,
}

impl Book {
    /// Build a book with its own requested-page signal, starting on the cover.
    pub fn new(config: BookConfig, textures: &dyn TextureProvider) -> Result<Self> {
        Self::with_signal(config, textures, PageSignal::new(0))
    }

    /// Build a book following an existing signal, e.g. one the UI also holds.
    ///
    /// Textures that cannot be resolved are logged and left unbound; the book
    /// still animates.
    pub fn with_signal(config: BookConfig, textures: &dyn TextureProvider, signal: PageSignal) -> Result<Self> {
        config.validate()?;
        let specs = build_pages(&config.catalog)?;
        let page_count = specs.len();

        if signal.get() > page_count {
            return Err(StorybookError::OutOfRangeIndex {
                index: signal.get(),
                page_count,
            });
        }

        let dims = config.page;
        let mesh = build_page_mesh(&dims);
        let skeleton = Skeleton::chain(dims.segments, dims.segment_width());
        let delayed = signal.get();

        let pages = specs
            .into_iter()
            .enumerate()
            .map(|(number, spec)| {
                let mut materials = PageMaterials::new(&spec.front, &spec.back);
                for error in materials.bind_textures(textures) {
                    log::warn!("page {}: {}", number, error);
                }
                Page {
                    number,
                    animator: PageAnimator::new(number, skeleton.bone_count(), delayed > number),
                    skeleton: skeleton.clone(),
                    materials,
                    spec,
                }
            })
            .collect();

        log::debug!(
            "built book with {} pages, {} bones per page",
            page_count,
            skeleton.bone_count()
        );

        Ok(Self {
            smoother: PageSmoother::new(signal, config.selection),
            config,
            mesh,
            pages,
            clock_ms: 0.0,
        })
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Rest geometry shared by every page.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, number: usize) -> Option<&Page> {
        self.pages.get(number)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Labels for a page selector, one per page.
    pub fn page_labels(&self) -> Vec<String> {
        (0..self.page_count()).map(page_label).collect()
    }

    /// A handle on the requested-page signal for UI code.
    pub fn signal(&self) -> PageSignal {
        self.smoother.signal().clone()
    }

    pub fn requested_page(&self) -> usize {
        self.smoother.requested()
    }

    /// The page boundary currently displayed.
    pub fn delayed_page(&self) -> usize {
        self.smoother.delayed()
    }

    /// Request a page boundary: 0 is the closed front, `page_count` the closed back.
    pub fn set_requested_page(&mut self, index: usize) -> Result<()> {
        let page_count = self.page_count();
        if index > page_count {
            return Err(StorybookError::OutOfRangeIndex { index, page_count });
        }
        self.smoother.signal().set(index);
        Ok(())
    }

    /// Book clock in milliseconds, advanced by every frame.
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn is_book_closed(&self) -> bool {
        let delayed = self.delayed_page();
        delayed == 0 || delayed == self.page_count()
    }

    pub fn page_state(&self, number: usize) -> PageState {
        PageState {
            is_open: self.delayed_page() > number,
            is_book_closed: self.is_book_closed(),
        }
    }

    /// Z offset stacking the page against its neighbours.
    pub fn depth_offset(&self, number: usize) -> f32 {
        (self.delayed_page() as f32 - number as f32) * self.config.page.depth
    }

    /// Transform of the group holding all pages.
    pub fn root_transform(&self) -> PageTransform {
        PageTransform::new([-self.config.page.width / 2.0, 0.0, 0.0], -FRAC_PI_2)
    }

    /// Transform of one page group inside the book group.
    pub fn page_transform(&self, number: usize) -> PageTransform {
        PageTransform::new([0.0, 0.0, self.depth_offset(number)], 0.0)
    }

    pub fn pointer_enter(&mut self, number: usize) -> Result<()> {
        self.page_mut(number)?.animator.set_hovered(true);
        Ok(())
    }

    pub fn pointer_leave(&mut self, number: usize) -> Result<()> {
        self.page_mut(number)?.animator.set_hovered(false);
        Ok(())
    }

    /// Turn the clicked page: an open page closes back onto its own number,
    /// a closed page opens past it.
    pub fn click(&mut self, number: usize) -> Result<()> {
        let is_open = self.page_state(number).is_open;
        self.page_mut(number)?.animator.set_hovered(false);
        self.set_requested_page(if is_open { number } else { number + 1 })
    }

    /// Advance the book by one rendered frame of `delta` seconds.
    ///
    /// Applies due page steps, then eases every page. Never fails; a
    /// non-finite or negative delta counts as zero.
    pub fn advance_frame(&mut self, delta: f32) -> Vec<StepEvent> {
        let delta = if delta.is_finite() && delta > 0.0 { delta } else { 0.0 };
        self.clock_ms += delta as f64 * 1000.0;

        let steps = self.smoother.poll(self.clock_ms);

        let frame = FrameTime {
            now_ms: self.clock_ms,
            delta,
        };
        let tuning = self.config.animation;
        let delayed = self.delayed_page();
        let is_book_closed = self.is_book_closed();

        for page in &mut self.pages {
            let state = PageState {
                is_open: delayed > page.number,
                is_book_closed,
            };
            page.animator.advance(frame, state, &tuning);
            page.skeleton.apply_pose(&page.animator.rotations());
            page.materials.set_emissive_intensity(page.animator.emissive_intensity());
        }

        steps
    }

    pub fn page_pose(&self, number: usize) -> Option<PagePose> {
        let page = self.pages.get(number)?;
        Some(PagePose {
            number,
            is_open: self.page_state(number).is_open,
            depth_offset: self.depth_offset(number),
            emissive_intensity: page.materials.emissive_intensity(),
            bones: page.skeleton.pose(),
        })
    }

    /// Pose of every page.
    pub fn pose(&self) -> BookPose {
        BookPose {
            clock_ms: self.clock_ms,
            requested: self.requested_page(),
            delayed: self.delayed_page(),
            pages: (0..self.page_count())
                .filter_map(|number| self.page_pose(number))
                .collect(),
        }
    }

    fn page_mut(&mut self, number: usize) -> Result<&mut Page> {
        let page_count = self.pages.len();
        self.pages
            .get_mut(number)
            .ok_or(StorybookError::OutOfRangeIndex {
                index: number,
                page_count,
            })
    }
}
