use crate::auth::{AdminPolicy, AuthenticatedUser};
use crate::cdn::{CdnError, ImageHost, UploadedImage};
use crate::forms::images::{DeleteImageRequest, UploadImageForm};
use crate::services::{ServiceError, ServiceResult};

/// Uploads a menu item photo to the image host.
///
/// `host` is `None` when no CDN credentials are configured.
pub async fn upload_image<H>(
    host: Option<&H>,
    policy: &AdminPolicy,
    user: &AuthenticatedUser,
    form: UploadImageForm,
) -> ServiceResult<UploadedImage>
where
    H: ImageHost + ?Sized,
{
    if !policy.is_admin(Some(user)) {
        return Err(ServiceError::Unauthorized);
    }

    let host = host.ok_or(CdnError::NotConfigured)?;
    let upload = form
        .into_upload()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    host.upload(upload).await.map_err(ServiceError::from)
}

/// Removes a photo from the image host. Menu items still pointing at it are
/// left unchanged.
pub async fn delete_image<H>(
    host: Option<&H>,
    policy: &AdminPolicy,
    user: &AuthenticatedUser,
    request: DeleteImageRequest,
) -> ServiceResult<()>
where
    H: ImageHost + ?Sized,
{
    if !policy.is_admin(Some(user)) {
        return Err(ServiceError::Unauthorized);
    }

    let host = host.ok_or(CdnError::NotConfigured)?;
    let public_id = request
        .into_public_id()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    host.destroy(&public_id).await.map_err(ServiceError::from)
}
