use crate::auth::types::UserProfile;
use crate::storage::user::entity::Model as UserModel;

impl From<UserModel> for UserProfile {
    fn from(model: UserModel) -> Self {
        UserProfile {
            id: model.id,
            username: model.username,
            email: model.email,
        }
    }
}
