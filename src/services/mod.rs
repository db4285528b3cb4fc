pub mod password;
pub mod token;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{UserError, UserRecord, UserService};
pub use user_service_impl::{SeaOrmUserService, bootstrap_admin};

pub mod ebook_service;
pub mod ebook_service_impl;
pub use ebook_service::{EbookDraft, EbookError, EbookRecord, EbookService, UploadedFile};
pub use ebook_service_impl::SeaOrmEbookService;

pub mod section_service;
pub mod section_service_impl;
pub use section_service::{SectionDraft, SectionError, SectionRecord, SectionService};
pub use section_service_impl::SeaOrmSectionService;

pub use token::{TokenError, TokenService};
